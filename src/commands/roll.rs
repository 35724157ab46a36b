use rand::Rng;

use crate::{
    constant::{self, dice as limits},
    gateway::Gateway,
    invocation::CommandInvocation,
};

use super::{CommandError, CommandHandler};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("`{0}` is not a dice expression like `2d6+1`")]
    Malformed(String),
    #[error("can roll between 1 and {} dice at once", limits::MAX_COUNT)]
    BadCount,
    #[error("dice need between {} and {} sides", limits::MIN_SIDES, limits::MAX_SIDES)]
    BadSides,
    #[error("the modifier must be at most {}", limits::MAX_MODIFIER)]
    BadModifier,
}

/// A parsed `NdM+K` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

impl Dice {
    /// Parses `NdM`, `dM`, `NdM+K` or `NdM-K`, ignoring case and spaces.
    pub fn parse(expression: &str) -> Result<Self, DiceError> {
        let malformed = || DiceError::Malformed(expression.to_string());
        let compact: String = expression
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let (count, rest) = compact.split_once('d').ok_or_else(malformed)?;
        let (sides, modifier) = match rest.find(['+', '-']) {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };

        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| malformed())?
        };
        let sides = sides.parse::<u32>().map_err(|_| malformed())?;
        let modifier = if modifier.is_empty() {
            0
        } else {
            // The sign was found by `find`, so it is a single ASCII byte
            let (sign, digits) = modifier.split_at(1);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let value = digits
                .parse::<i64>()
                .ok()
                .filter(|v| *v <= limits::MAX_MODIFIER)
                .ok_or(DiceError::BadModifier)?;
            if sign == "-" { -value } else { value }
        };

        if count == 0 || count > limits::MAX_COUNT {
            return Err(DiceError::BadCount);
        }
        if !(limits::MIN_SIDES..=limits::MAX_SIDES).contains(&sides) {
            return Err(DiceError::BadSides);
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    pub fn roll(&self, rng: &mut impl Rng) -> Roll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let total = rolls.iter().map(|&r| r as i64).sum::<i64>() + self.modifier;
        Roll {
            dice: *self,
            rolls,
            total,
        }
    }
}

impl std::fmt::Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    pub dice: Dice,
    pub rolls: Vec<u32>,
    pub total: i64,
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rolls = self
            .rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "🎲 {}: [{rolls}] = **{}**", self.dice, self.total)
    }
}

pub struct Handler;
#[serenity::async_trait]
impl CommandHandler for Handler {
    fn name(&self) -> &str {
        constant::commands::ROLL
    }

    fn description(&self) -> &str {
        "Rolls dice, e.g. `2d6+1`."
    }

    async fn run(
        &self,
        gateway: &dyn Gateway,
        invocation: &CommandInvocation,
    ) -> Result<(), CommandError> {
        let expression = match invocation.arguments.as_str() {
            "" => limits::DEFAULT,
            e => e,
        };
        let dice =
            Dice::parse(expression).map_err(|e| CommandError::bad_arguments(e.to_string()))?;
        let roll = dice.roll(&mut rand::thread_rng());

        gateway
            .say(invocation.channel_id, &roll.to_string())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use serenity::all::{ChannelId, MessageId, UserId};

    use super::*;
    use crate::{
        commands::CommandRegistry,
        gateway::testing::{Call, RecordingGateway},
        invocation::Outcome,
    };

    #[test]
    fn test_parse_dice() {
        assert_eq!(
            Dice::parse("2d6+1"),
            Ok(Dice {
                count: 2,
                sides: 6,
                modifier: 1
            })
        );
        assert_eq!(
            Dice::parse("d20"),
            Ok(Dice {
                count: 1,
                sides: 20,
                modifier: 0
            })
        );
        assert_eq!(
            Dice::parse(" 3 D 8 - 2 "),
            Ok(Dice {
                count: 3,
                sides: 8,
                modifier: -2
            })
        );

        assert!(matches!(Dice::parse("banana"), Err(DiceError::Malformed(_))));
        assert!(matches!(Dice::parse("2d"), Err(DiceError::Malformed(_))));
        assert!(matches!(Dice::parse("2d6+"), Err(DiceError::Malformed(_))));
        assert!(matches!(Dice::parse("2d6*2"), Err(DiceError::Malformed(_))));
        assert_eq!(Dice::parse("101d6"), Err(DiceError::BadCount));
        assert_eq!(Dice::parse("0d6"), Err(DiceError::BadCount));
        assert_eq!(Dice::parse("1d1"), Err(DiceError::BadSides));
        assert_eq!(Dice::parse("1d1001"), Err(DiceError::BadSides));

        assert!(matches!(Dice::parse("2d6+-3"), Err(DiceError::Malformed(_))));
        assert!(matches!(Dice::parse("2d6-+3"), Err(DiceError::Malformed(_))));
        assert!(matches!(Dice::parse("2d6--3"), Err(DiceError::Malformed(_))));
        assert_eq!(
            Dice::parse("1d6+9223372036854775807"),
            Err(DiceError::BadModifier)
        );
        assert_eq!(
            Dice::parse("1d6-99999999999999999999999"),
            Err(DiceError::BadModifier)
        );
        assert_eq!(Dice::parse("1d6+100001"), Err(DiceError::BadModifier));
        assert_eq!(
            Dice::parse("100d1000-100000"),
            Ok(Dice {
                count: 100,
                sides: 1000,
                modifier: -100000
            })
        );
    }

    #[test]
    fn test_roll_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let dice = Dice::parse("10d6-3").unwrap();
        for _ in 0..100 {
            let roll = dice.roll(&mut rng);
            assert_eq!(roll.rolls.len(), 10);
            assert!(roll.rolls.iter().all(|r| (1..=6).contains(r)));
            assert_eq!(
                roll.total,
                roll.rolls.iter().map(|&r| r as i64).sum::<i64>() - 3
            );
        }
        assert_eq!(dice.to_string(), "10d6-3");
    }

    #[tokio::test]
    async fn test_roll_command() {
        let gateway = RecordingGateway::new();
        let registry = CommandRegistry::with_builtins();
        let invoke = |content: &str| {
            CommandInvocation::parse(
                "mo ",
                ChannelId::new(1),
                MessageId::new(2),
                UserId::new(3),
                content,
            )
            .unwrap()
        };

        assert_eq!(registry.execute(&gateway, &invoke("mo roll 2d6")).await, Outcome::Success);
        assert_eq!(
            registry.execute(&gateway, &invoke("mo roll lots")).await,
            Outcome::BadArguments
        );
        assert_eq!(registry.execute(&gateway, &invoke("mo roll")).await, Outcome::Success);
        assert_eq!(
            registry
                .execute(&gateway, &invoke("mo roll 1d6+9223372036854775807"))
                .await,
            Outcome::BadArguments
        );

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Say(_, text) if text.starts_with("🎲 2d6: [")));
        assert!(matches!(&calls[1], Call::Say(_, text) if text.starts_with("🎲 1d6: [")));
    }
}
