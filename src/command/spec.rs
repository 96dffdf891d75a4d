use super::types::{ArgKind, ArgSpec, CommandSpec};

const NO_ARGS: [ArgSpec; 0] = [];
const ARGS_TOOL: [ArgSpec; 1] = [ArgSpec {
    name: "tool",
    kind: ArgKind::String,
    required: true,
}];
const ARGS_POINTER: [ArgSpec; 4] = [
    ArgSpec {
        name: "x",
        kind: ArgKind::F64,
        required: true,
    },
    ArgSpec {
        name: "y",
        kind: ArgKind::F64,
        required: true,
    },
    ArgSpec {
        name: "kind",
        kind: ArgKind::String,
        required: false,
    },
    ArgSpec {
        name: "pressure",
        kind: ArgKind::F64,
        required: false,
    },
];
const ARGS_TOUCH: [ArgSpec; 1] = [ArgSpec {
    name: "contacts",
    kind: ArgKind::I32,
    required: true,
}];
const ARGS_RECT: [ArgSpec; 4] = [
    ArgSpec {
        name: "x0",
        kind: ArgKind::F64,
        required: true,
    },
    ArgSpec {
        name: "y0",
        kind: ArgKind::F64,
        required: true,
    },
    ArgSpec {
        name: "x1",
        kind: ArgKind::F64,
        required: true,
    },
    ArgSpec {
        name: "y1",
        kind: ArgKind::F64,
        required: true,
    },
];
const ARGS_GOTO_PAGE: [ArgSpec; 1] = [ArgSpec {
    name: "page",
    kind: ArgKind::I32,
    required: true,
}];
const ARGS_SET_ZOOM: [ArgSpec; 1] = [ArgSpec {
    name: "value",
    kind: ArgKind::F64,
    required: true,
}];

const COMMAND_SPECS: [CommandSpec; 19] = [
    CommandSpec {
        id: "tool",
        title: "Select Tool",
        args: &ARGS_TOOL,
    },
    CommandSpec {
        id: "down",
        title: "Pointer Down",
        args: &ARGS_POINTER,
    },
    CommandSpec {
        id: "move",
        title: "Pointer Move",
        args: &ARGS_POINTER,
    },
    CommandSpec {
        id: "up",
        title: "Pointer Up",
        args: &ARGS_POINTER,
    },
    CommandSpec {
        id: "touch",
        title: "Multi-touch Contact",
        args: &ARGS_TOUCH,
    },
    CommandSpec {
        id: "rect",
        title: "Draw Rectangle",
        args: &ARGS_RECT,
    },
    CommandSpec {
        id: "delete-selected",
        title: "Delete Selection",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "clear-all",
        title: "Clear Page",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "undo",
        title: "Undo",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "save",
        title: "Save Annotations",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "next-page",
        title: "Next Page",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "prev-page",
        title: "Previous Page",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "first-page",
        title: "First Page",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "last-page",
        title: "Last Page",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "goto-page",
        title: "Go to Page",
        args: &ARGS_GOTO_PAGE,
    },
    CommandSpec {
        id: "set-zoom",
        title: "Set Zoom",
        args: &ARGS_SET_ZOOM,
    },
    CommandSpec {
        id: "zoom-in",
        title: "Zoom In",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "zoom-out",
        title: "Zoom Out",
        args: &NO_ARGS,
    },
    CommandSpec {
        id: "quit",
        title: "Quit",
        args: &NO_ARGS,
    },
];

pub fn command_registry() -> &'static [CommandSpec] {
    &COMMAND_SPECS
}

/// One usage line per command, e.g. `down <x> <y> [kind] [pressure]`.
pub fn usage_lines() -> Vec<String> {
    command_registry()
        .iter()
        .map(|spec| {
            let mut line = spec.id.to_string();
            for arg in spec.args {
                if arg.required {
                    line.push_str(&format!(" <{}>", arg.name));
                } else {
                    line.push_str(&format!(" [{}]", arg.name));
                }
            }
            line
        })
        .collect()
}
