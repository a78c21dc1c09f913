use rand::RngCore;

use crate::models::tournament::Round;

/// Trim and upper-case a free-text field. Blank input is `None`.
pub fn normalize_upper(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_uppercase)
}

/// `"<NOMBRE> <TEMPORADA> - <Rueda> rueda"`, without the round part when there is none.
pub fn tournament_label(nombre: &str, temporada: i32, rueda: Option<Round>) -> String {
    match rueda {
        Some(rueda) => {
            let raw = rueda.as_str();
            let mut chars = raw.chars();
            let capitalized: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            };
            format!("{} {} - {} rueda", nombre, temporada, capitalized)
        }
        None => format!("{} {}", nombre, temporada),
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_invitation_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_cases_and_drops_blanks() {
        assert_eq!(normalize_upper(Some("  colo colo ")), Some("COLO COLO".into()));
        assert_eq!(normalize_upper(Some("   ")), None);
        assert_eq!(normalize_upper(None), None);
    }

    #[test]
    fn label_includes_the_round_when_present() {
        assert_eq!(
            tournament_label("PRIMERA DIVISION", 2024, Some(Round::Segunda)),
            "PRIMERA DIVISION 2024 - Segunda rueda"
        );
        assert_eq!(tournament_label("COPA", 2023, None), "COPA 2023");
    }

    #[test]
    fn invitation_tokens_are_64_hex_chars_and_unique() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
