/// Derives the stable identity used for teams, competitors, judges and
/// matchups. Components are lowercased and sorted first, so "Smith & Jones"
/// and "Jones & Smith" resolve to the same team across tournaments even when
/// tab software lists the partners in a different order.
pub fn entity_id(nodes: &[&str]) -> String {
    let mut parts: Vec<String> =
        nodes.iter().map(|node| node.to_lowercase()).collect();
    parts.sort();

    sha256::digest(parts.concat())[..24].to_string()
}

/// Identity of one person, from their display name.
pub fn person_id(name: &str) -> String {
    let parts: Vec<&str> = name.split(' ').collect();
    entity_id(&parts)
}
