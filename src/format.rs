//! Colorized one-line status string
//!
//! Renders `City: 66.30°F Partly Cloudy, Humidity: 65%` with a color per
//! role. In shell mode every escape sequence is wrapped in `%{ %}` and `%` is
//! doubled so zsh prompt expansion does not count or interpret them.

use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};

use crate::data::Observation;

/// Role of a piece of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Reset everything
    Clear,
    /// Separator between fields
    Dash,
    /// Values
    Data,
    /// Label/value delimiter
    Delim,
    /// Labels and the city name
    Text,
}

impl Role {
    fn escape(self) -> String {
        let reset = SetAttribute(Attribute::Reset);
        let bold = SetAttribute(Attribute::Bold);
        match self {
            Role::Clear => reset.to_string(),
            Role::Dash => format!("{}{}", reset, SetForegroundColor(Color::DarkBlue)),
            Role::Data => format!("{}{}{}", reset, bold, SetForegroundColor(Color::DarkYellow)),
            Role::Delim => format!("{}{}", reset, SetForegroundColor(Color::DarkMagenta)),
            Role::Text => format!("{}{}{}", reset, bold, SetForegroundColor(Color::DarkCyan)),
        }
    }
}

/// Builds the status line piece by piece
struct Painter {
    shell: bool,
    out: String,
}

impl Painter {
    fn new(shell: bool) -> Self {
        Self {
            shell,
            out: String::new(),
        }
    }

    fn color(&mut self, role: Role) -> &mut Self {
        if self.shell {
            self.out.push_str("%{");
            self.out.push_str(&role.escape());
            self.out.push_str("%}");
        } else {
            self.out.push_str(&role.escape());
        }
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        if self.shell {
            self.out.push_str(&text.replace('%', "%%"));
        } else {
            self.out.push_str(text);
        }
        self
    }

    fn finish(mut self) -> String {
        self.color(Role::Clear);
        self.out
    }
}

/// Renders the observation as a single status line
pub fn format_status(observation: &Observation, shell: bool) -> String {
    let mut painter = Painter::new(shell);

    painter
        .color(Role::Text)
        .text(&observation.city)
        .color(Role::Delim)
        .text(":")
        .color(Role::Data)
        .text(" ")
        .text(&observation.temperature_display());

    if !observation.conditions.is_empty() {
        painter.text(" ").text(&observation.conditions);
    }

    if !observation.humidity.is_empty() {
        painter
            .color(Role::Dash)
            .text(",")
            .color(Role::Text)
            .text(" Humidity")
            .color(Role::Delim)
            .text(":")
            .color(Role::Data)
            .text(" ")
            .text(&observation.humidity);
    }

    painter.finish()
}
