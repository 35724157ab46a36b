use crate::{config, invocation::Outcome};

/// The status marker left on a command message once it has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Ok,
    Confused,
    Error,
}

/// Decides which marker an outcome earns.
///
/// Unknown commands and rejected arguments are usage mistakes and only get
/// [`Marker::Confused`]. Everything else that failed is an internal fault and
/// gets [`Marker::Error`], which the invoker may ask to have disclosed.
pub fn classify(outcome: &Outcome) -> Marker {
    match outcome {
        Outcome::Success => Marker::Ok,
        Outcome::NotFound | Outcome::BadArguments => Marker::Confused,
        Outcome::Failure(_) => Marker::Error,
    }
}

/// Reaction symbols for each marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSymbols {
    pub ok: String,
    pub confused: String,
    pub error: String,
}

impl MarkerSymbols {
    pub fn symbol(&self, marker: Marker) -> &str {
        match marker {
            Marker::Ok => &self.ok,
            Marker::Confused => &self.confused,
            Marker::Error => &self.error,
        }
    }
}

impl From<&config::Feedback> for MarkerSymbols {
    fn from(feedback: &config::Feedback) -> Self {
        Self {
            ok: feedback.ok_symbol.clone(),
            confused: feedback.confused_symbol.clone(),
            error: feedback.error_symbol.clone(),
        }
    }
}
