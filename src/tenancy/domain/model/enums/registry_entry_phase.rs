#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryEntryPhase {
    Warming,
    Ready,
}

impl RegistryEntryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warming => "warming",
            Self::Ready => "ready",
        }
    }
}
