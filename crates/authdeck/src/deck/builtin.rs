use super::{Deck, DeckError};

/// A deck compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinDeck {
    pub name: &'static str,
    pub summary: &'static str,
    pub source: &'static str,
}

pub const BUILTIN_DECKS: &[BuiltinDeck] = &[
    BuiltinDeck {
        name: "oauth",
        summary: "OAuth 2.0 authorization code flow with PKCE, plus refresh",
        source: include_str!("../../decks/oauth-code-pkce.yaml"),
    },
    BuiltinDeck {
        name: "oidc",
        summary: "OpenID Connect login with ID token validation",
        source: include_str!("../../decks/oidc-login.yaml"),
    },
    BuiltinDeck {
        name: "id-jag",
        summary: "Cross-app access with an Identity Assertion JWT Authorization Grant",
        source: include_str!("../../decks/id-jag.yaml"),
    },
];

/// Deck shown when neither a file nor a deck name is given.
pub const DEFAULT_DECK: &str = "oauth";

pub fn names() -> Vec<&'static str> {
    BUILTIN_DECKS.iter().map(|d| d.name).collect()
}

pub fn find(name: &str) -> Option<&'static BuiltinDeck> {
    BUILTIN_DECKS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
}

pub fn load(name: &str) -> Result<Deck, DeckError> {
    let builtin = find(name).ok_or_else(|| DeckError::UnknownBuiltin {
        name: name.to_string(),
        available: names().join(", "),
    })?;
    Deck::parse(builtin.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::validate;

    #[test]
    fn every_builtin_parses_cleanly() {
        for builtin in BUILTIN_DECKS {
            let deck = load(builtin.name).expect("built-in deck parses");
            assert!(deck.step_count() > 0);
            assert!(
                validate(&deck).is_empty(),
                "{}: {:?}",
                builtin.name,
                validate(&deck)
            );
        }
    }

    #[test]
    fn default_deck_exists() {
        assert!(find(DEFAULT_DECK).is_some());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find("OIDC").is_some());
    }

    #[test]
    fn unknown_name_lists_available() {
        let err = load("saml").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("saml"));
        assert!(msg.contains("oauth, oidc, id-jag"));
    }

    #[test]
    fn id_jag_deck_issues_an_id_jag() {
        use crate::deck::Action;
        use crate::tokens::TokenKind;

        let deck = load("id-jag").expect("parses");
        let issues_jag = deck.slides.iter().flat_map(|s| &s.steps).any(|step| {
            step.on_enter
                .contains(&Action::IssueToken(TokenKind::IdJag))
        });
        assert!(issues_jag);
    }

    #[test]
    fn every_step_routes_its_visible_edges() {
        use std::time::Instant;

        use crate::stage::layout::MonoMeasure;
        use crate::stage::routing::types::RouteResult;
        use crate::stage::{Stage, StageConfig};

        for builtin in BUILTIN_DECKS {
            let deck = load(builtin.name).expect("parses");
            for slide in &deck.slides {
                let mut stage = Stage::mount(Instant::now(), StageConfig::default());
                for (i, step) in slide.steps.iter().enumerate() {
                    let view = slide.step_view(i);
                    let present: Vec<String> = view.nodes.iter().map(|n| n.id.clone()).collect();
                    stage.set_scene(view.nodes, view.edges, &MonoMeasure);
                    for (edge, result) in &stage.routes().results {
                        if present.contains(&edge.from) && present.contains(&edge.to) {
                            assert!(
                                matches!(result, RouteResult::Drawn(_)),
                                "{}/{}/{}: edge '{}' not drawn",
                                builtin.name,
                                slide.title,
                                step.name,
                                edge.id
                            );
                        }
                    }
                }
            }
        }
    }
}
