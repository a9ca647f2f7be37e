//! Terminal ANSI - inherits the terminal's own palette

pub const THEME: &str = r##"# Terminal ANSI theme for tutorial-reader
# Uses the 16 ANSI colors so the terminal's palette applies

[meta]
name = "Terminal ANSI"
version = 1

[ui]
background = "ansi:bg"
foreground = "ansi:fg"
border = "ansi:8"
border_focused = "ansi:11"
title = "ansi:12"
status_bar = "ansi:fg"
selection_bg = "ansi:8"
selection_fg = "ansi:15"
muted = "ansi:8"

[status]
ok = "ansi:2"
warn = "ansi:3"
error = "ansi:1"

[lesson]
heading = "ansi:13"
subheading = "ansi:12"
minor_heading = "ansi:14"
code_inline = "ansi:6"
code_block = "ansi:7"
link = "ansi:11"
quote = "ansi:8"

[diagram]
node = "ansi:12"
edge = "ansi:8"
label = "ansi:11"
"##;
