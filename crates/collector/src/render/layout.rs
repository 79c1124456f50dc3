use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLES: &str = r#"
body { font-family: sans-serif; margin: 2rem auto; max-width: 760px; color: #222; }
header { text-align: center; }
.status-online, .status-offline { font-size: 1.2rem; font-weight: bold; }
.tiles { display: flex; gap: 1rem; justify-content: center; margin: 1rem 0; }
.tile { flex: 1; padding: 1rem; text-align: center; }
.tile-value { font-size: 1.6rem; }
.tile-note { font-size: 0.8rem; margin-top: 0.4rem; }
.chart { margin: 1rem 0; }
.legend { display: flex; gap: 1rem; list-style: none; padding: 0; }
.axis-label, .caption { text-align: center; font-size: 0.9rem; }
"#;

pub fn page(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLES)) }
            }
            body {
                (content)
            }
        }
    }
}
