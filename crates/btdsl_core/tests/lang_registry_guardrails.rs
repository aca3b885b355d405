use std::collections::HashMap;

use btdsl_core::lang::foreign;
use btdsl_core::lang::keywords;
use btdsl_core::lang::operators;
use btdsl_core::lang::policies;
use btdsl_core::lang::punctuation;
use btdsl_core::lang::types;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(keywords::as_str(info.id), info.canonical, "keyword as_str mismatch for {:?}", info.id);

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate keyword spelling {:?}: {:?} and {:?}", info.canonical, prev, info.id);
        }
    }
}

#[test]
fn reserved_word_set_is_exact() {
    let expected = [
        "import",
        "extern",
        "type",
        "var",
        "const",
        "tree",
        "true",
        "false",
        "null",
        "action",
        "condition",
        "control",
        "decorator",
        "subtree",
        "in",
        "out",
        "ref",
        "mut",
        "as",
        "string",
        "vec",
        "_",
    ];
    assert_eq!(keywords::KEYWORDS.len(), expected.len());
    for word in expected {
        assert!(keywords::from_str(word).is_some(), "missing reserved word {word}");
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, operators::OperatorId> = HashMap::new();
    for info in operators::OPERATORS {
        assert_eq!(operators::from_str(info.spelling), Some(info.id), "operator not resolvable: {}", info.spelling);
        assert_eq!(operators::as_str(info.id), info.spelling);
        if let Some(prev) = seen.insert(info.spelling, info.id) {
            panic!("duplicate operator spelling {:?}: {:?} and {:?}", info.spelling, prev, info.id);
        }
    }
}

#[test]
fn punctuation_spellings_unique_and_disjoint_from_operators() {
    let mut seen: HashMap<&'static str, punctuation::PunctuationId> = HashMap::new();
    for info in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
        assert_eq!(
            operators::from_str(info.canonical),
            None,
            "punctuation {:?} collides with an operator",
            info.canonical
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate punctuation spelling {:?}: {:?} and {:?}", info.canonical, prev, info.id);
        }
    }
}

#[test]
fn builtin_types_resolve_aliases_and_are_not_keywords() {
    for info in types::BUILTIN_TYPES {
        assert_eq!(types::from_str(info.canonical), Some(info.id));
        assert_eq!(types::as_str(info.id), info.canonical);
        for &alias in info.aliases {
            assert_eq!(types::from_str(alias), Some(info.id), "alias {alias} not resolvable");
            assert!(keywords::from_str(alias).is_none(), "alias {alias} is reserved");
        }
    }
}

#[test]
fn foreign_keywords_are_not_reserved_and_carry_help() {
    for info in foreign::FOREIGN_KEYWORDS {
        assert!(keywords::from_str(info.spelling).is_none(), "{} is reserved", info.spelling);
        assert!(!info.help.is_empty(), "{} lacks help text", info.spelling);
    }
}

#[test]
fn precondition_spellings_round_trip() {
    for (kind, name) in policies::PRECONDITIONS {
        assert_eq!(policies::precondition_from_str(name), Some(*kind));
        assert_eq!(policies::precondition_as_str(*kind), *name);
    }
    assert_eq!(policies::precondition_from_str("Guard"), None);
}
