//! Reader Dark - default theme, muted dark background

pub const THEME: &str = r##"# Reader Dark theme for tutorial-reader

[meta]
name = "Reader Dark"
version = 1

[ui]
background = "#1d2026"
foreground = "#d7dae0"
border = "#4b5263"
border_focused = "#e5c07b"
title = "#61afef"
status_bar = "#abb2bf"
selection_bg = "#3e4451"
selection_fg = "#ffffff"
muted = "#7f848e"
border_type = "rounded"

[status]
ok = "#98c379"
warn = "#e5c07b"
error = "#e06c75"

[lesson]
heading = "#c678dd"
subheading = "#61afef"
minor_heading = "#56b6c2"
code_inline = "#56b6c2"
code_block = "#abb2bf"
link = "#e5c07b"
quote = "#7f848e"

[diagram]
node = "#61afef"
edge = "#7f848e"
label = "#e5c07b"
"##;
