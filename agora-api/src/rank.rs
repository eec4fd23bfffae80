use std::{fmt, str::FromStr};

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RankMode {
    /// Most recent first
    #[default]
    New,

    /// Highest score first
    Top,

    /// Most commented first
    Comments,

    /// Highest score plus comment count first
    Trending,
}

impl RankMode {
    pub const ALL: [RankMode; 4] = [
        RankMode::New,
        RankMode::Top,
        RankMode::Comments,
        RankMode::Trending,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RankMode::New => "new",
            RankMode::Top => "top",
            RankMode::Comments => "comments",
            RankMode::Trending => "trending",
        }
    }
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RankMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<RankMode> {
        RankMode::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown rank mode {s:?}"))
    }
}
