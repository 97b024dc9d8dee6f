/// Completion certificate rendering
///
/// Renders the course-completion certificate as a standalone SVG document
/// and embeds it in a `data:image/svg+xml;base64,…` URI stored on the
/// user record. The artifact only needs the learner's name and the issue
/// date.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 700;

/// Renders the certificate SVG for a learner
///
/// The name is XML-escaped before interpolation.
pub fn render_svg(name: &str, issued_at: DateTime<Utc>) -> String {
    let name = escape_xml(name);
    let date = issued_at.format("%d/%m/%Y");

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">
  <rect width="{WIDTH}" height="{HEIGHT}" fill="#ffffff"/>
  <rect x="20" y="20" width="{inner_w}" height="{inner_h}" fill="none" stroke="#1a3c6e" stroke-width="6"/>
  <rect x="36" y="36" width="{inner2_w}" height="{inner2_h}" fill="none" stroke="#c9a227" stroke-width="2"/>
  <text x="500" y="140" text-anchor="middle" font-family="Georgia, serif" font-size="44" fill="#1a3c6e">Certificat de Réussite</text>
  <text x="500" y="200" text-anchor="middle" font-family="Georgia, serif" font-size="22" fill="#444444">Formation Inspecteur Auto</text>
  <text x="500" y="300" text-anchor="middle" font-family="Georgia, serif" font-size="20" fill="#444444">Ce certificat est décerné à</text>
  <text x="500" y="370" text-anchor="middle" font-family="Georgia, serif" font-size="40" fill="#111111">{name}</text>
  <text x="500" y="450" text-anchor="middle" font-family="Georgia, serif" font-size="20" fill="#444444">pour avoir complété l'ensemble des modules de la formation</text>
  <text x="500" y="560" text-anchor="middle" font-family="Georgia, serif" font-size="18" fill="#444444">Délivré le {date}</text>
  <text x="500" y="640" text-anchor="middle" font-family="Georgia, serif" font-size="16" fill="#1a3c6e">inspecteur-auto.fr</text>
</svg>"##,
        inner_w = WIDTH - 40,
        inner_h = HEIGHT - 40,
        inner2_w = WIDTH - 72,
        inner2_h = HEIGHT - 72,
    )
}

/// Renders the certificate and wraps it as a base64 data URI
pub fn data_uri(name: &str, issued_at: DateTime<Utc>) -> String {
    let svg = render_svg(name, issued_at);
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(svg.as_bytes())
    )
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_contains_name_and_date() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap();
        let svg = render_svg("Jean Dupont", issued);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Jean Dupont"));
        assert!(svg.contains("15/03/2025"));
    }

    #[test]
    fn test_name_is_escaped() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap();
        let svg = render_svg("<script>&\"", issued);

        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;&amp;&quot;"));
    }

    #[test]
    fn test_data_uri_shape() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap();
        let uri = data_uri("Jean Dupont", issued);

        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        // Round-trips through base64 back to the SVG
        let encoded = uri.trim_start_matches("data:image/svg+xml;base64,");
        let decoded = STANDARD.decode(encoded).expect("valid base64");
        let svg = String::from_utf8(decoded).expect("valid utf8");
        assert!(svg.contains("Jean Dupont"));
    }
}
