//! Operator console command parsing.

use warren_core::{GeneratorKind, MapRequest};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    GenMap(MapRequest),
    ShowMap,
    Exit,
}

/// Parses one console line. `genmap` arguments are positional and optional:
/// `genmap [type] [width] [height] [minRooms] [maxRooms] [seed]`.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Err("empty command".to_string());
    };
    let arguments: Vec<&str> = parts.collect();

    match command {
        "exit" => Ok(Command::Exit),
        "showmap" => Ok(Command::ShowMap),
        "genmap" => parse_genmap(&arguments),
        other => Err(format!("unknown command '{other}' (try genmap, showmap, exit)")),
    }
}

fn parse_genmap(arguments: &[&str]) -> Result<Command, String> {
    if arguments.len() > 6 {
        return Err(format!(
            "genmap takes at most 6 arguments (type width height minRooms maxRooms seed), \
             got {}",
            arguments.len()
        ));
    }

    let mut request = MapRequest::default();
    if let Some(kind) = arguments.first() {
        request.kind = match *kind {
            "room" => GeneratorKind::RoomBased,
            "passage" => GeneratorKind::Passage,
            "walk" => GeneratorKind::RandomWalk,
            other => {
                return Err(format!("unknown generator '{other}' (room, passage, walk)"));
            }
        };
    }
    if let Some(value) = arguments.get(1) {
        request.width = parse_number("width", value)?;
    }
    if let Some(value) = arguments.get(2) {
        request.height = parse_number("height", value)?;
    }
    if let Some(value) = arguments.get(3) {
        request.min_rooms = parse_number("minRooms", value)?;
    }
    if let Some(value) = arguments.get(4) {
        request.max_rooms = parse_number("maxRooms", value)?;
    }
    if let Some(value) = arguments.get(5) {
        let seed =
            value.parse::<u64>().map_err(|_| format!("seed '{value}' must be a number"))?;
        request.seed = Some(seed);
    }
    Ok(Command::GenMap(request))
}

fn parse_number(name: &str, value: &str) -> Result<usize, String> {
    value.parse().map_err(|_| format!("{name} '{value}' must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_genmap_uses_the_defaults() {
        let Command::GenMap(request) = parse("genmap").expect("valid") else {
            panic!("expected a genmap command");
        };
        assert_eq!(request, MapRequest::default());
        assert_eq!(request.kind, GeneratorKind::Passage);
    }

    #[test]
    fn a_full_argument_list_parses() {
        let Command::GenMap(request) =
            parse("genmap walk 25 25 3 6 123").expect("valid")
        else {
            panic!("expected a genmap command");
        };
        assert_eq!(request.kind, GeneratorKind::RandomWalk);
        assert_eq!((request.width, request.height), (25, 25));
        assert_eq!((request.min_rooms, request.max_rooms), (3, 6));
        assert_eq!(request.seed, Some(123));
    }

    #[test]
    fn showmap_and_exit_parse() {
        assert_eq!(parse("showmap").expect("valid"), Command::ShowMap);
        assert_eq!(parse("exit").expect("valid"), Command::Exit);
    }

    #[test]
    fn unknown_generators_are_rejected() {
        let error = parse("genmap maze").expect_err("must reject");
        assert!(error.contains("unknown generator"));
    }

    #[test]
    fn non_numeric_dimensions_are_rejected() {
        let error = parse("genmap room wide").expect_err("must reject");
        assert!(error.contains("must be a number"));
    }

    #[test]
    fn unknown_commands_name_the_alternatives() {
        let error = parse("quit").expect_err("must reject");
        assert!(error.contains("genmap, showmap, exit"));
    }
}
