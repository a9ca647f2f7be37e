//! Reader Light - paper-like light theme

pub const THEME: &str = r##"# Reader Light theme for tutorial-reader

[meta]
name = "Reader Light"
version = 1

[ui]
background = "#fafafa"
foreground = "#383a42"
border = "#a0a1a7"
border_focused = "#c18401"
title = "#4078f2"
status_bar = "#383a42"
selection_bg = "#e5e5e6"
selection_fg = "#202227"
muted = "#8e9098"
border_type = "rounded"

[status]
ok = "#50a14f"
warn = "#c18401"
error = "#e45649"

[lesson]
heading = "#a626a4"
subheading = "#4078f2"
minor_heading = "#0184bc"
code_inline = "#0184bc"
code_block = "#383a42"
link = "#c18401"
quote = "#8e9098"

[diagram]
node = "#4078f2"
edge = "#a0a1a7"
label = "#c18401"
"##;
