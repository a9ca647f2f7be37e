//! Catppuccin Mocha - soothing pastel dark theme

pub const THEME: &str = r##"# Catppuccin Mocha theme for tutorial-reader

[meta]
name = "Catppuccin Mocha"
version = 1

[ui]
background = "#1e1e2e"
foreground = "#cdd6f4"
border = "#585b70"
border_focused = "#f9e2af"
title = "#89b4fa"
status_bar = "#cdd6f4"
selection_bg = "#585b70"
selection_fg = "#cdd6f4"
muted = "#9399b2"

[status]
ok = "#a6e3a1"
warn = "#f9e2af"
error = "#f38ba8"

[lesson]
heading = "#f5c2e7"
subheading = "#89b4fa"
minor_heading = "#94e2d5"
code_inline = "#94e2d5"
code_block = "#bac2de"
link = "#f9e2af"
quote = "#9399b2"

[diagram]
node = "#89b4fa"
edge = "#9399b2"
label = "#f9e2af"
"##;
