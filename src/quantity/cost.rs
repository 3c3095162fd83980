quantity!(Cost, "kr");

impl Cost {
    /// Round to whole kroner, the way the cards show it.
    #[must_use]
    pub fn round(self) -> Self {
        Self(self.0.round())
    }
}
