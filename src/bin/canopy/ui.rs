use nu_ansi_term::{Color, Style};
use std::io::IsTerminal;

use canopy::cli::render::TreeLine;

pub struct Ui {
    palette: Palette,
    paint: bool,
}

impl Ui {
    pub fn new(plain: bool) -> Self {
        let paint = !plain && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        let palette = if paint {
            Palette::dark()
        } else {
            Palette::plain()
        };
        Self { palette, paint }
    }

    pub fn heading(&self, title: &str) {
        let formatted = format!("{HEADING_ICON} {title}");
        if self.paint {
            println!("{}", self.palette.heading.paint(formatted));
        } else {
            println!("{formatted}");
        }
    }

    pub fn tree(&self, lines: &[TreeLine]) {
        if lines.is_empty() {
            println!("  (empty)");
            return;
        }
        for line in lines {
            let indent = "  ".repeat(line.depth + 1);
            let marker = if line.has_children { "+" } else { "-" };
            let name = self.palette.name.paint(line.name.as_str());
            match &line.description {
                Some(description) => println!(
                    "{indent}{} {name}: {}",
                    self.palette.marker.paint(marker),
                    self.palette.description.paint(description.as_str())
                ),
                None => println!("{indent}{} {name}", self.palette.marker.paint(marker)),
            }
        }
    }

    pub fn section<'a, I>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let rows: Vec<(&str, String)> = rows.into_iter().collect();
        if rows.is_empty() {
            return;
        }
        self.heading(title);
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.paint {
                println!(
                    "  {} {value}",
                    self.palette.key.paint(format!("{key:>key_width$}:"))
                );
            } else {
                println!("  {key:>key_width$}: {value}");
            }
        }
    }

    pub fn success(&self, message: &str) {
        let prefix = if self.paint {
            self.palette.success.paint(SUCCESS_ICON)
        } else {
            Style::new().paint(SUCCESS_ICON)
        };
        println!("{prefix} {message}");
    }
}

struct Palette {
    heading: Style,
    key: Style,
    name: Style,
    description: Style,
    marker: Style,
    success: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            heading: Style::new().fg(Color::Purple).bold(),
            key: Style::new().fg(Color::LightBlue).bold(),
            name: Style::new().fg(Color::White).bold(),
            description: Style::new().fg(Color::DarkGray),
            marker: Style::new().fg(Color::LightBlue),
            success: Style::new().fg(Color::LightGreen).bold(),
        }
    }

    fn plain() -> Self {
        Self {
            heading: Style::new(),
            key: Style::new(),
            name: Style::new(),
            description: Style::new(),
            marker: Style::new(),
            success: Style::new(),
        }
    }
}

const HEADING_ICON: &str = "▸";
const SUCCESS_ICON: &str = "✔";
