quantity!(Celsius, "°C");

impl Celsius {
    /// Round to whole degrees.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn round_to_degrees(self) -> i64 {
        self.0.round() as i64
    }
}
