use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::types::{LinkKind, ProviderKind};

static NETEASE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(163cn)|(\.163\.)").unwrap());
// Dots are unescaped, any character around `qq` matches.
static QQ_MUSIC_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".qq.").unwrap());
static QISHUI_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"qishui").unwrap());

pub(crate) fn rule_for(kind: ProviderKind) -> &'static Regex {
    match kind {
        ProviderKind::NetEase => &NETEASE_RULE,
        ProviderKind::QqMusic => &QQ_MUSIC_RULE,
        ProviderKind::Qishui => &QISHUI_RULE,
    }
}

/// Tag a raw link with the first provider whose rule matches it.
pub fn classify(link: &str) -> LinkKind {
    ProviderKind::ALL
        .into_iter()
        .find(|kind| kind.matches(link))
        .map(LinkKind::Provider)
        .unwrap_or(LinkKind::Unrecognized)
}
