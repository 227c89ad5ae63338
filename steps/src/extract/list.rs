use crate::action::Action;
use crate::token::{InlineToken, ListItem, Token};

/// Text ending in this suffix right before a code span marks the span as a file path.
const FILE_REFERENCE_SUFFIX: &str = "in ";

/// Match the command-block pattern: a single-item list, a blank line, then a
/// code block whose lines are the commands to run.
///
/// `lookahead` holds the two tokens following the list.
pub fn command_block(
    items: &[ListItem],
    lookahead: (Option<&Token>, Option<&Token>),
) -> Option<Action> {
    let [item] = items else {
        return None;
    };
    let (Some(Token::Space), Some(Token::Code { text })) = lookahead else {
        return None;
    };

    let mut commands = split_commands(text);
    match commands.len() {
        0 => None,
        1 => Some(Action::RunCommand {
            text: item.raw.clone(),
            command: commands.remove(0),
        }),
        _ => Some(Action::RunCommands {
            text: item.raw.clone(),
            commands,
        }),
    }
}

/// One command per line. Blank lines carry no command and are dropped.
fn split_commands(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify every item of a list independently, in order.
pub fn classify_items(items: &[ListItem]) -> Vec<Action> {
    let mut actions = Vec::new();
    for item in items {
        classify_item(item, &mut actions);
    }
    actions
}

fn classify_item(item: &ListItem, actions: &mut Vec<Action>) {
    let instruction = item.raw.trim();
    let before = actions.len();

    for (index, sub_token) in item.sub_tokens.iter().enumerate() {
        let InlineToken::CodeSpan(value) = sub_token else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }

        let names_file = index >= 1
            && matches!(
                &item.sub_tokens[index - 1],
                InlineToken::Text(previous) if previous.ends_with(FILE_REFERENCE_SUFFIX)
            );

        actions.push(if names_file {
            Action::WriteCodeInstruction {
                text: instruction.to_string(),
                file_path: value.clone(),
            }
        } else {
            Action::RunCommand {
                text: instruction.to_string(),
                command: value.clone(),
            }
        });
    }

    if actions.len() == before {
        actions.push(Action::Instruction {
            text: instruction.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> InlineToken {
        InlineToken::Text(s.into())
    }

    fn span(s: &str) -> InlineToken {
        InlineToken::CodeSpan(s.into())
    }

    #[test]
    fn code_span_after_in_names_a_file() {
        let item = ListItem::new(
            "Define it in `foo/bar.txt`.",
            vec![text("Define it in "), span("foo/bar.txt"), text(".")],
        );
        assert_eq!(
            classify_items(&[item]),
            vec![Action::WriteCodeInstruction {
                text: "Define it in `foo/bar.txt`.".into(),
                file_path: "foo/bar.txt".into(),
            }]
        );
    }

    #[test]
    fn other_code_spans_are_commands() {
        let item = ListItem::new("Run `ls -la`.", vec![text("Run "), span("ls -la"), text(".")]);
        assert_eq!(
            classify_items(&[item]),
            vec![Action::RunCommand {
                text: "Run `ls -la`.".into(),
                command: "ls -la".into(),
            }]
        );
    }

    #[test]
    fn suffix_check_is_case_sensitive_and_needs_the_space() {
        let items = [
            ListItem::new("IN `a`", vec![text("IN "), span("a")]),
            ListItem::new("in`b`", vec![text("in"), span("b")]),
            ListItem::new("`c` first", vec![span("c"), text(" first")]),
        ];
        let actions = classify_items(&items);
        assert!(
            actions
                .iter()
                .all(|a| matches!(a, Action::RunCommand { .. })),
            "{actions:?}"
        );
    }

    #[test]
    fn each_code_span_is_classified_on_its_own() {
        let item = ListItem::new(
            "  3. Create it in `app.js` and run `node app.js`  ",
            vec![
                text("Create it in "),
                span("app.js"),
                text(" and run "),
                span("node app.js"),
            ],
        );
        assert_eq!(
            classify_items(&[item]),
            vec![
                Action::WriteCodeInstruction {
                    text: "3. Create it in `app.js` and run `node app.js`".into(),
                    file_path: "app.js".into(),
                },
                Action::RunCommand {
                    text: "3. Create it in `app.js` and run `node app.js`".into(),
                    command: "node app.js".into(),
                },
            ]
        );
    }

    #[test]
    fn emphasis_between_text_and_span_breaks_adjacency() {
        let item = ListItem::new(
            "Save in **the** `out`",
            vec![text("Save in "), InlineToken::Other, text(" "), span("out")],
        );
        assert!(matches!(
            classify_items(&[item]).as_slice(),
            [Action::RunCommand { command, .. }] if command == "out"
        ));
    }

    #[test]
    fn item_without_code_span_is_a_trimmed_instruction() {
        let item = ListItem::new("1. Set up an account.\n", vec![text("Set up an account.")]);
        assert_eq!(
            classify_items(&[item]),
            vec![Action::Instruction {
                text: "1. Set up an account.".into()
            }]
        );
    }

    #[test]
    fn command_block_needs_exactly_one_item() {
        let code = Token::Code {
            text: "make".into(),
        };
        let one = [ListItem::new("1. Build", vec![])];
        let two = [ListItem::new("1. Build", vec![]), ListItem::new("2. Ship", vec![])];
        assert!(command_block(&one, (Some(&Token::Space), Some(&code))).is_some());
        assert!(command_block(&two, (Some(&Token::Space), Some(&code))).is_none());
        assert!(command_block(&one, (Some(&code), None)).is_none());
        assert!(command_block(&one, (Some(&Token::Space), None)).is_none());
    }

    #[test]
    fn command_block_keeps_raw_item_text_and_skips_blank_lines() {
        let code = Token::Code {
            text: "amplify add api\r\n\namplify add storage".into(),
        };
        let items = [ListItem::new("2. Add the API and database resources you need.", vec![])];
        assert_eq!(
            command_block(&items, (Some(&Token::Space), Some(&code))),
            Some(Action::RunCommands {
                text: "2. Add the API and database resources you need.".into(),
                commands: vec!["amplify add api".into(), "amplify add storage".into()],
            })
        );
    }

    #[test]
    fn empty_code_block_is_not_a_command_block() {
        let code = Token::Code { text: "\n".into() };
        let items = [ListItem::new("1. Nothing to run", vec![])];
        assert_eq!(command_block(&items, (Some(&Token::Space), Some(&code))), None);
    }

    #[test]
    fn blank_code_spans_produce_nothing() {
        let item = ListItem::new(
            "- Type ` ` then run `make`.",
            vec![text("Type "), span(" "), text(" then run "), span("make"), text(".")],
        );
        assert_eq!(
            classify_items(&[item]),
            vec![Action::RunCommand {
                text: "- Type ` ` then run `make`.".into(),
                command: "make".into(),
            }]
        );

        let item = ListItem::new("- Press ` `.", vec![text("Press "), span(" "), text(".")]);
        assert_eq!(
            classify_items(&[item]),
            vec![Action::Instruction {
                text: "- Press ` `.".into()
            }]
        );
    }
}
