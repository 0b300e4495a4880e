/// Theme table in declaration order; detection and reports follow this order.
pub const DEFAULT_THEMES: &[(&str, &[&str])] = &[
    ("performance", &["slow", "fast", "lag", "crash", "loading"]),
    ("login_auth", &["login", "otp", "password", "sign in"]),
    ("payments", &["payment", "upi", "refund", "transaction"]),
    ("support", &["support", "customer", "help"]),
    ("ui_ux", &["ui", "interface", "design", "navigation"]),
    ("features", &["feature", "update", "option"]),
    ("stability", &["bug", "error", "issue", "fail"]),
];

/// Maps a sentence to every theme with at least one trigger substring in it.
#[derive(Debug, Clone, Copy)]
pub struct ThemeDetector<'a> {
    table: &'a [(&'a str, &'a [&'a str])],
}

impl Default for ThemeDetector<'static> {
    fn default() -> Self { Self { table: DEFAULT_THEMES } }
}

impl<'a> ThemeDetector<'a> {
    pub fn new(table: &'a [(&'a str, &'a [&'a str])]) -> Self { Self { table } }

    pub fn theme_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.table.iter().map(|(name, _)| *name)
    }

    pub fn detect(&self, sentence: &str) -> Vec<&'a str> {
        let s = sentence.to_lowercase();
        self.table
            .iter()
            .filter(|(_, triggers)| triggers.iter().any(|t| s.contains(t)))
            .map(|(name, _)| *name)
            .collect()
    }
}
