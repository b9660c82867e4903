use derive_more::Display;

/// Spellings with a fixed meaning to the binding layer.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    /// Tags the next parameter name as the rest parameter.
    #[display("&")]
    Rest,
    #[display("nil")]
    Nil,
    #[display("true")]
    True,
    #[display("false")]
    False,
}

impl Reserved {
    pub const ALL: [Reserved; 4] = [
        Reserved::Rest,
        Reserved::Nil,
        Reserved::True,
        Reserved::False,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reserved::Rest => "&",
            Reserved::Nil => "nil",
            Reserved::True => "true",
            Reserved::False => "false",
        }
    }
}

impl TryFrom<&str> for Reserved {
    type Error = ();

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Reserved::ALL
            .into_iter()
            .find(|reserved| reserved.as_str() == text)
            .ok_or(())
    }
}
