use kurbo::{Point, Rect};

use crate::error::{AppError, AppResult};
use crate::input::{InputEvent, PointerKind, PointerSample};
use crate::tool::Tool;

use super::spec::command_registry;
use super::types::Command;

pub fn parse_command_text(input: &str) -> AppResult<Command> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("command must not be empty"));
    }

    let (id, args_text) = match trimmed.find(char::is_whitespace) {
        Some(index) => (&trimmed[..index], trimmed[index..].trim_start()),
        None => (trimmed, ""),
    };

    if !command_registry().iter().any(|spec| spec.id == id) {
        return Err(AppError::invalid_argument(format!(
            "unknown command id: {id}"
        )));
    }

    match id {
        "tool" => parse_tool(args_text),
        "down" => parse_pointer(id, args_text).map(|s| Command::Pointer(InputEvent::PointerDown(s))),
        "move" => parse_pointer(id, args_text).map(|s| Command::Pointer(InputEvent::PointerMove(s))),
        "up" => parse_pointer(id, args_text).map(|s| Command::Pointer(InputEvent::PointerUp(s))),
        "touch" => parse_touch(args_text),
        "rect" => parse_rect(args_text),
        "delete-selected" => parse_no_args(id, args_text, Command::DeleteSelected),
        "clear-all" => parse_no_args(id, args_text, Command::ClearAll),
        "undo" => parse_no_args(id, args_text, Command::Undo),
        "save" => parse_no_args(id, args_text, Command::Save),
        "next-page" => parse_no_args(id, args_text, Command::NextPage),
        "prev-page" => parse_no_args(id, args_text, Command::PrevPage),
        "first-page" => parse_no_args(id, args_text, Command::FirstPage),
        "last-page" => parse_no_args(id, args_text, Command::LastPage),
        "goto-page" => parse_goto_page(args_text),
        "set-zoom" => parse_set_zoom(args_text),
        "zoom-in" => parse_no_args(id, args_text, Command::ZoomIn),
        "zoom-out" => parse_no_args(id, args_text, Command::ZoomOut),
        "quit" => parse_no_args(id, args_text, Command::Quit),
        _ => Err(AppError::unsupported(
            "command parser is out of sync with registry",
        )),
    }
}

/// Parses one command per line. Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> AppResult<Vec<Command>> {
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = parse_command_text(line).map_err(|err| {
            AppError::invalid_argument(format!("line {}: {err}", index + 1))
        })?;
        commands.push(command);
    }
    Ok(commands)
}

fn parse_no_args(id: &str, args_text: &str, cmd: Command) -> AppResult<Command> {
    if args_text.is_empty() {
        return Ok(cmd);
    }
    Err(AppError::invalid_argument(format!(
        "{id} does not accept arguments"
    )))
}

fn parse_tool(args_text: &str) -> AppResult<Command> {
    let mut parts = args_text.split_whitespace();
    let Some(tool_text) = parts.next() else {
        return Err(AppError::invalid_argument("tool requires 1 argument: tool"));
    };
    if parts.next().is_some() {
        return Err(AppError::invalid_argument("tool accepts exactly 1 argument"));
    }

    let tool = Tool::parse(tool_text).ok_or_else(|| {
        AppError::invalid_argument("tool must be one of none, pen, highlighter, eraser")
    })?;
    Ok(Command::SelectTool { tool })
}

fn parse_pointer(id: &str, args_text: &str) -> AppResult<PointerSample> {
    let parts: Vec<&str> = args_text.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(AppError::invalid_argument(format!(
            "{id} requires 2 arguments: x y"
        )));
    }
    if parts.len() > 4 {
        return Err(AppError::invalid_argument(format!(
            "{id} accepts at most 4 arguments"
        )));
    }

    let x = parse_coordinate(id, "x", parts[0])?;
    let y = parse_coordinate(id, "y", parts[1])?;
    let kind = match parts.get(2) {
        Some(text) => PointerKind::parse(text).ok_or_else(|| {
            AppError::invalid_argument(format!("{id} kind must be mouse, touch or pen"))
        })?,
        None => PointerKind::Mouse,
    };
    let pressure = match parts.get(3) {
        Some(text) => {
            let value = text.parse::<f32>().map_err(|_| {
                AppError::invalid_argument(format!("{id} pressure must be a number"))
            })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::invalid_argument(format!(
                    "{id} pressure must be within 0..=1"
                )));
            }
            value
        }
        None => 1.0,
    };

    Ok(PointerSample {
        position: Point::new(x, y),
        pressure,
        kind,
    })
}

fn parse_touch(args_text: &str) -> AppResult<Command> {
    let mut parts = args_text.split_whitespace();
    let Some(count_text) = parts.next() else {
        return Err(AppError::invalid_argument(
            "touch requires 1 argument: contacts",
        ));
    };
    if parts.next().is_some() {
        return Err(AppError::invalid_argument("touch accepts exactly 1 argument"));
    }

    let contacts = count_text
        .parse::<u8>()
        .map_err(|_| AppError::invalid_argument("touch contacts must be an integer in 0..=255"))?;
    Ok(Command::Pointer(InputEvent::MultiTouch { contacts }))
}

fn parse_rect(args_text: &str) -> AppResult<Command> {
    let parts: Vec<&str> = args_text.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(AppError::invalid_argument(
            "rect requires 4 arguments: x0 y0 x1 y1",
        ));
    }

    let x0 = parse_coordinate("rect", "x0", parts[0])?;
    let y0 = parse_coordinate("rect", "y0", parts[1])?;
    let x1 = parse_coordinate("rect", "x1", parts[2])?;
    let y1 = parse_coordinate("rect", "y1", parts[3])?;
    Ok(Command::Rect {
        rect: Rect::new(x0, y0, x1, y1),
    })
}

fn parse_goto_page(args_text: &str) -> AppResult<Command> {
    let mut parts = args_text.split_whitespace();
    let Some(page_text) = parts.next() else {
        return Err(AppError::invalid_argument(
            "goto-page requires 1 argument: page",
        ));
    };
    if parts.next().is_some() {
        return Err(AppError::invalid_argument(
            "goto-page accepts exactly 1 argument",
        ));
    }

    let page = page_text
        .parse::<i32>()
        .map_err(|_| AppError::invalid_argument("goto-page page must be an integer"))?;
    if page < 1 {
        return Err(AppError::invalid_argument("page number must be >= 1"));
    }

    Ok(Command::GotoPage {
        page: page as usize,
    })
}

fn parse_set_zoom(args_text: &str) -> AppResult<Command> {
    let mut parts = args_text.split_whitespace();
    let Some(value_text) = parts.next() else {
        return Err(AppError::invalid_argument(
            "set-zoom requires 1 argument: value",
        ));
    };
    if parts.next().is_some() {
        return Err(AppError::invalid_argument(
            "set-zoom accepts exactly 1 argument",
        ));
    }

    let value = value_text
        .parse::<f32>()
        .map_err(|_| AppError::invalid_argument("set-zoom value must be a number"))?;

    Ok(Command::SetZoom { value })
}

fn parse_coordinate(id: &str, name: &str, text: &str) -> AppResult<f64> {
    let value = text
        .parse::<f64>()
        .map_err(|_| AppError::invalid_argument(format!("{id} {name} must be a number")))?;
    if !value.is_finite() {
        return Err(AppError::invalid_argument(format!(
            "{id} {name} must be finite"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::{parse_command_text, parse_script};
    use crate::command::Command;
    use crate::input::{InputEvent, PointerKind, PointerSample};
    use crate::tool::Tool;

    #[test]
    fn parses_basic_commands() {
        assert_eq!(
            parse_command_text("next-page").expect("parse should succeed"),
            Command::NextPage
        );
        assert_eq!(
            parse_command_text("set-zoom 1.25").expect("parse should succeed"),
            Command::SetZoom { value: 1.25 }
        );
        assert_eq!(
            parse_command_text("tool highlighter").expect("parse should succeed"),
            Command::SelectTool {
                tool: Tool::Highlighter
            }
        );
        assert_eq!(
            parse_command_text("rect 1 2 30 40").expect("parse should succeed"),
            Command::Rect {
                rect: Rect::new(1.0, 2.0, 30.0, 40.0)
            }
        );
    }

    #[test]
    fn pointer_commands_accept_kind_and_pressure() {
        assert_eq!(
            parse_command_text("down 10 20").expect("parse should succeed"),
            Command::Pointer(InputEvent::PointerDown(PointerSample::mouse(10.0, 20.0)))
        );
        assert_eq!(
            parse_command_text("move 1.5 2 pen 0.4").expect("parse should succeed"),
            Command::Pointer(InputEvent::PointerMove(PointerSample {
                position: Point::new(1.5, 2.0),
                pressure: 0.4,
                kind: PointerKind::Pen,
            }))
        );
        assert!(parse_command_text("down 1").is_err());
        assert!(parse_command_text("down 1 2 stylus").is_err());
        assert!(parse_command_text("up 1 2 pen 1.5").is_err());
        assert!(parse_command_text("down NaN 2").is_err());
    }

    #[test]
    fn rejects_unknown_and_extra_arguments() {
        assert!(parse_command_text("").is_err());
        assert!(parse_command_text("draw 1 2").is_err());
        assert!(parse_command_text("undo now").is_err());
        assert!(parse_command_text("goto-page 0").is_err());
        assert!(parse_command_text("tool marker").is_err());
    }

    #[test]
    fn script_skips_comments_and_reports_line_numbers() {
        let script = "# warm up\ntool pen\n\ndown 1 1 # start\nup 2 2\n";
        let commands = parse_script(script).expect("script should parse");
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], Command::SelectTool { tool: Tool::Pen });

        let err = parse_script("undo\nbogus\n").expect_err("line 2 is invalid");
        assert!(err.to_string().contains("line 2"));
    }
}
