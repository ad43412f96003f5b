//! Fallback Chain Rewriter
//!
//! Rewrites every `fontFamily` declaration into: the node's own families
//! (expanded to their loaded subsets), then every other loaded subset.
//! Any node can therefore fall back to glyphs from any loaded font.

use std::collections::HashSet;

use crate::font_state::FamilySubsets;
use crate::tree::StyledNode;

/// Split a CSS-style family list, trimming whitespace and surrounding quotes
pub fn parse_family_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the ordered chain for one declaration
pub fn resolve_chain(raw: &str, subsets: &FamilySubsets) -> Vec<String> {
    let suffix: Vec<&str> = subsets.all_subsets().collect();
    chain_with_suffix(raw, subsets, &suffix)
}

fn chain_with_suffix(raw: &str, subsets: &FamilySubsets, suffix: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut chain = vec![];

    for family in parse_family_list(raw) {
        match subsets.get(&family) {
            Some(ids) => {
                for id in ids {
                    if seen.insert(id.clone()) {
                        chain.push(id.clone());
                    }
                }
            }
            // System or generic name that was never loaded
            None => {
                if seen.insert(family.clone()) {
                    chain.push(family);
                }
            }
        }
    }

    for id in suffix {
        if !seen.contains(*id) {
            seen.insert(id.to_string());
            chain.push(id.to_string());
        }
    }

    chain
}

/// Rewrite every declared font family in the tree, in place
pub fn rewrite(tree: &mut StyledNode, subsets: &FamilySubsets) {
    let suffix: Vec<&str> = subsets.all_subsets().collect();
    tree.walk_mut(|node| {
        let Some(style) = node.style.as_mut() else {
            return;
        };
        if let Some(raw) = style.font_family.as_deref() {
            let chain = chain_with_suffix(raw, subsets, &suffix);
            style.font_family = Some(chain.join(", "));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsets() -> FamilySubsets {
        let mut map = FamilySubsets::new();
        map.push("Inter", "Inter__0".into());
        map.push("Inter", "Inter__1".into());
        map.push("Noto Sans JP", "Noto Sans JP__2".into());
        map.push("Emoji", "Emoji__4".into());
        map
    }

    #[test]
    fn test_parse_strips_quotes_and_space() {
        assert_eq!(
            parse_family_list(r#" "Noto Sans JP" , 'Inter',sans-serif,, "#),
            ["Noto Sans JP", "Inter", "sans-serif"]
        );
    }

    #[test]
    fn test_own_families_first_then_fallbacks() {
        let chain = resolve_chain("'Noto Sans JP', sans-serif", &subsets());
        assert_eq!(
            chain,
            ["Noto Sans JP__2", "sans-serif", "Inter__0", "Inter__1", "Emoji__4"]
        );
    }

    #[test]
    fn test_duplicates_collapsed() {
        let chain = resolve_chain("Inter, Inter, Emoji", &subsets());
        assert_eq!(chain, ["Inter__0", "Inter__1", "Emoji__4", "Noto Sans JP__2"]);
    }

    #[test]
    fn test_no_loaded_fonts_keeps_declaration() {
        let chain = resolve_chain("Georgia, serif", &FamilySubsets::new());
        assert_eq!(chain, ["Georgia", "serif"]);
    }

    #[test]
    fn test_rewrite_touches_only_declaring_nodes() {
        let mut tree = StyledNode::new("div")
            .with_font_family("Emoji")
            .with_child(StyledNode::new("span"))
            .with_child(StyledNode::new("p").with_font_family("\"Inter\""));

        rewrite(&mut tree, &subsets());

        assert_eq!(
            tree.font_family(),
            Some("Emoji__4, Inter__0, Inter__1, Noto Sans JP__2")
        );
        assert_eq!(tree.children[0].font_family(), None);
        assert_eq!(
            tree.children[1].font_family(),
            Some("Inter__0, Inter__1, Noto Sans JP__2, Emoji__4")
        );
    }
}
