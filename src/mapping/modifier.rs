//! Zerlegung eines Befehls in Segmente und Modifier

/// Position der ersten Dezimalziffer in `s`, `None` wenn keine vorkommt
pub fn find_first_digit(s: &str) -> Option<usize> {
    s.bytes().position(|b| b.is_ascii_digit())
}

/// Trennt ein Segment an der ersten Ziffer in Aktionstext und Modifier.
///
/// Alles ab der ersten Ziffer gilt als Modifier-Text. Lässt er sich nicht
/// vollständig als Zahl lesen (`UP15x`, Überlauf), gibt es keinen Modifier.
pub fn split_modifier(segment: &str) -> (&str, Option<u32>) {
    match find_first_digit(segment) {
        None => (segment, None),
        Some(idx) => {
            let (action, modifier_text) = segment.split_at(idx);
            (action, modifier_text.parse::<u32>().ok())
        }
    }
}

/// Nicht-leere Segmente eines kommagetrennten Befehls in Reihenfolge
pub fn split_batch(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
