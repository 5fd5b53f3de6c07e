//! Version-gated build fixups for historical releases
//!
//! Old Wine releases no longer build with current toolchains. Upstream
//! fixed each breakage eventually; building an older tag means
//! cherry-picking the fix back in, or disabling the affected module when
//! the fix spans too many commits. The windows below are
//! `start <= version < fixed-in`.

use vintner_types::WineVersion;

/// Fixups applicable to one tagged release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fixups {
    /// Upstream commits to cherry-pick, in application order.
    pub cherry_picks: Vec<&'static str>,
    /// Extra arguments for every configure step.
    pub configure_args: Vec<&'static str>,
}

struct Window {
    from: (u32, u32, u32),
    to: (u32, u32, u32),
    cherry_picks: &'static [&'static str],
    configure_args: &'static [&'static str],
}

const WINDOWS: &[Window] = &[
    // bison 3 rejects the old YYLEX/YYPARSE declarations in the wrc and
    // wmc parsers; fixed in 1.7.0
    Window {
        from: (1, 4, 0),
        to: (1, 7, 0),
        cherry_picks: &[
            "3f98185fb8f88c181877e909ab1b6422fb9bca1e",
            "8fcac3b2bb8ce4cdbcffc126df779bf1be168882",
            "bda5a2ffb833b2824325bd9361b30dbaf5f78068",
            "f86c46f6403fe338a544ab134bdf563c5b0934ae",
            "ffbe1ca986bd299e1fc894440849914378adbf5c",
        ],
        configure_args: &[],
    },
    Window {
        from: (1, 5, 10),
        to: (1, 7, 0),
        cherry_picks: &["c14e322a92a24e704836c5c12207c694a30e805f"],
        configure_args: &[],
    },
    // gcc 4.9 miscompiles msidb table-column lookups; fixed in 1.7.20
    Window {
        from: (1, 4, 0),
        to: (1, 7, 20),
        cherry_picks: &["deb274226783ab886bdb44876944e156757efe2b"],
        configure_args: &[],
    },
    // the PostScript driver needs a long fix series against modern cups;
    // too many cherry-picks to carry, so the module is disabled instead
    Window {
        from: (1, 4, 0),
        to: (1, 5, 10),
        cherry_picks: &[],
        configure_args: &["--disable-wineps.drv"],
    },
    // cupsGetPPD removed from the public cups API; fixed in 1.9.14
    Window {
        from: (1, 4, 0),
        to: (1, 9, 14),
        cherry_picks: &["10065d2acd0a9e1e852a8151c95569b99d1b3294"],
        configure_args: &[],
    },
    // gnutls_cipher_get_block_size type conflict; fixed in 1.9.13
    Window {
        from: (1, 8, 0),
        to: (1, 9, 13),
        cherry_picks: &["bf5ac531a030bce9e798ab66bc53e84a65ca8fdb"],
        configure_args: &[],
    },
    // INVALID_SOCKET redefinition in winsock.h; fixed in 2.13
    Window {
        from: (1, 7, 6),
        to: (2, 13, 0),
        cherry_picks: &["28173f06932edd85a64a952120d29b9bb1e762ea"],
        configure_args: &[],
    },
];

fn key(v: WineVersion) -> (u32, u32, u32) {
    (v.major, v.minor, v.patch.unwrap_or(0))
}

/// Look up the fixups for a tagged release. HEAD builds and releases
/// newer than every window get none.
#[must_use]
pub fn fixups_for(version: WineVersion) -> Fixups {
    let k = key(version);
    let mut fixups = Fixups::default();
    for window in WINDOWS {
        if k >= window.from && k < window.to {
            fixups.cherry_picks.extend_from_slice(window.cherry_picks);
            fixups
                .configure_args
                .extend_from_slice(window.configure_args);
        }
    }
    fixups
}
