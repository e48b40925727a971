use chrono::NaiveDate;

use crate::stats::Stats;

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 15.0;
const BOTTOM_PADDING: f32 = 15.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_ROW_CHARS: usize = 28;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub error: &'static str,
}

impl Theme {
    /// Case-insensitive lookup of `dark` / `light`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                error: "#f85149",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
                error: "#cf222e",
            },
        }
    }
}

// Utilities for building SVG content

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn width_of(s: &str) -> usize {
    s.chars().count()
}

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = width_of(&key_part) + width_of(value);
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(width_of(&base));
    format!("{base}{}", "-".repeat(dash_count))
}

enum Line {
    Header(String),
    Blank,
    Stat { k: String, d: String, v: String },
    Note(String),
    Error(String),
}

fn render_lines(lines: &[Line]) -> String {
    let mut tspans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;

        match line {
            Line::Blank => {}
            Line::Header(text) => {
                tspans.push_str(&format!(
                    "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\">{}</tspan>\n",
                    escape_xml(text)
                ));
            }
            Line::Stat { k, d, v } => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}" class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>
"#,
                    escape_xml(k),
                    escape_xml(d),
                    escape_xml(v)
                ));
            }
            Line::Note(text) => {
                tspans.push_str(&format!(
                    "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\" class=\"cc\">{}</tspan>\n",
                    escape_xml(text)
                ));
            }
            Line::Error(text) => {
                tspans.push_str(&format!(
                    "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\" class=\"error\">{}</tspan>\n",
                    escape_xml(text)
                ));
            }
        }
    }
    tspans
}

/// Renders stats and error badges.
///
/// Built once at startup and shared by every request.
#[derive(Clone, Debug)]
pub struct BadgeRenderer {
    title: String,
    default_theme: Theme,
}

impl BadgeRenderer {
    pub fn new(title: impl Into<String>, default_theme: Theme) -> Self {
        Self {
            title: title.into(),
            default_theme,
        }
    }

    pub fn render_stats(&self, stats: &Stats, theme: Option<Theme>, as_of: NaiveDate) -> String {
        let solved_value = stats.solved_count.to_string();
        let level_value = stats.level.to_string();
        let as_of_value = format!("as of {}", as_of.format("%Y-%m-%d"));

        let rows_for_width = [
            ("User", stats.username.as_str()),
            ("Solved", solved_value.as_str()),
            ("Level", level_value.as_str()),
        ];

        let align_width = rows_for_width
            .iter()
            .map(|(k, v)| width_of(k) + 2 + width_of(v))
            .chain([width_of(&self.title) + 1, width_of(&as_of_value)])
            .max()
            .unwrap_or(0)
            .max(MIN_ROW_CHARS);

        let mut lines = vec![Line::Header(build_header_line(&self.title, align_width))];
        for (key, value) in rows_for_width {
            let (k, d, v) = build_stat_row(key, value, align_width);
            lines.push(Line::Stat { k, d, v });
        }
        lines.push(Line::Blank);
        lines.push(Line::Note(as_of_value));

        let label = format!(
            "{}: {} solved, level {}",
            stats.username, stats.solved_count, stats.level
        );
        self.frame(&lines, align_width, &label, theme)
    }

    pub fn render_error(&self, message: &str, theme: Option<Theme>) -> String {
        let align_width = (width_of(&self.title) + 1)
            .max(width_of(message))
            .max(MIN_ROW_CHARS);

        let lines = [
            Line::Header(build_header_line(&self.title, align_width)),
            Line::Error(message.to_string()),
        ];

        self.frame(&lines, align_width, message, theme)
    }

    fn frame(
        &self,
        lines: &[Line],
        align_width: usize,
        label: &str,
        theme: Option<Theme>,
    ) -> String {
        let colors = theme.unwrap_or(self.default_theme).colors();

        let w = LEFT_PADDING + (align_width as f32) * CHAR_WIDTH + RIGHT_PADDING;
        let h = (lines.len() as i32 - 1) as f32 * LINE_HEIGHT as f32
            + START_Y as f32
            + BOTTOM_PADDING;

        format!(
            r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     role="img" aria-label="{label}"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<title>{label}</title>

<style>
.key   {{ fill: {key}; }}
.value {{ fill: {value}; }}
.cc    {{ fill: {cc}; }}
.error {{ fill: {error}; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<text fill="{text}" xml:space="preserve">
{body}
</text>

</svg>
"#,
            label = escape_xml(label),
            bg = colors.bg,
            text = colors.text,
            key = colors.key,
            value = colors.value,
            cc = colors.cc,
            error = colors.error,
            body = render_lines(lines)
        )
    }
}
