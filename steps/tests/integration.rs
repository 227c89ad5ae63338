use steps::action::Action;
use steps::actions_from_markdown;
use steps::parser::Parser;

fn parse(source: &str) -> steps::Document {
    Parser::new(source.to_string(), 0).parse()
}

fn instruction(text: &str) -> Action {
    Action::Instruction { text: text.into() }
}

fn run(text: &str, command: &str) -> Action {
    Action::RunCommand {
        text: text.into(),
        command: command.into(),
    }
}

const WEB_APP: &str = "\
GitHub Copilot: Sure, here's an example implementation:

1. Set up an AWS account and create a new Amplify app.
2. Install the Amplify CLI and initialize the app with `amplify init`.
3. Define the job posting schema in `amplify/backend/api/jobposting/schema.graphql`.
4. Create a login page with the Amplify Auth components.

Here's the code:

```js
// pages/login.js
import { withAuthenticator } from '@aws-amplify/ui-react';

function Login() {
  return <div></div>;
}

export default withAuthenticator(Login);

// styles/globals.css
* {
  box-sizing: border-box;
}
```

Note that this is just an example.
";

#[test]
fn web_app_walkthrough() {
    assert_eq!(
        actions_from_markdown(WEB_APP),
        vec![
            Action::Information {
                text: "GitHub Copilot: Sure, here's an example implementation:".into()
            },
            instruction("1. Set up an AWS account and create a new Amplify app."),
            run(
                "2. Install the Amplify CLI and initialize the app with `amplify init`.",
                "amplify init"
            ),
            Action::WriteCodeInstruction {
                text: "3. Define the job posting schema in `amplify/backend/api/jobposting/schema.graphql`."
                    .into(),
                file_path: "amplify/backend/api/jobposting/schema.graphql".into(),
            },
            instruction("4. Create a login page with the Amplify Auth components."),
            Action::Information {
                text: "Here's the code:".into()
            },
            Action::WriteCode {
                file_path: "pages/login.js".into(),
                code: "import { withAuthenticator } from '@aws-amplify/ui-react';\n\nfunction Login() {\n  return <div></div>;\n}\n\nexport default withAuthenticator(Login);\n".into(),
            },
            Action::WriteCode {
                file_path: "styles/globals.css".into(),
                code: "* {\n  box-sizing: border-box;\n}\n".into(),
            },
            Action::Information {
                text: "Note that this is just an example.".into()
            },
        ]
    );
}

#[test]
fn command_blocks_under_single_item_lists() {
    let source = "\
1. Use the Amplify CLI to create a new Amplify project.

```
amplify init
```

2. Add the API and database resources you need.

```
amplify add api
amplify add storage
```
";
    assert_eq!(
        actions_from_markdown(source),
        vec![
            run(
                "1. Use the Amplify CLI to create a new Amplify project.",
                "amplify init"
            ),
            Action::RunCommands {
                text: "2. Add the API and database resources you need.".into(),
                commands: vec!["amplify add api".into(), "amplify add storage".into()],
            },
        ]
    );
}

#[test]
fn headings_only_at_level_two() {
    let source = "# Project\n\n## Step 1\n\n### Details\n";
    assert_eq!(actions_from_markdown(source), vec![instruction("Step 1")]);
}

#[test]
fn unordered_items_and_unmarked_code() {
    let source = "- Run `cargo build`.\n- Then relax.\n\n```rust\nfn main() {}\n```\n";
    assert_eq!(
        actions_from_markdown(source),
        vec![
            run("- Run `cargo build`.", "cargo build"),
            instruction("- Then relax."),
        ]
    );
}

#[test]
fn loose_list_items_are_classified_like_tight_ones() {
    let source = "1. Run `make`.\n\n2. Edit the config in `app.toml`.\n";
    assert_eq!(
        actions_from_markdown(source),
        vec![
            run("1. Run `make`.", "make"),
            Action::WriteCodeInstruction {
                text: "2. Edit the config in `app.toml`.".into(),
                file_path: "app.toml".into(),
            },
        ]
    );
}

#[test]
fn reconstructed_markdown_yields_the_same_actions() {
    for source in [
        WEB_APP,
        "1. Deploy.\n\n```\nnpm run build\nnpm run deploy\n```\n",
        "Install the\ntoolchain\n---\n\nRun it.\n",
    ] {
        let document = parse(source);
        let rebuilt = parse(&document.to_markdown());
        assert_eq!(rebuilt.actions(), document.actions(), "{}", document.to_markdown());
    }
}

#[test]
fn multi_line_setext_heading_survives_rendering() {
    let document = parse("Install the\ntoolchain\n---\n\nRun it.\n");
    let expected = vec![
        instruction("Install the\ntoolchain"),
        Action::Information {
            text: "Run it.".into(),
        },
    ];
    assert_eq!(document.actions(), expected);
    assert_eq!(parse(&document.to_markdown()).actions(), expected);
}

#[test]
fn spans_line_up_with_tokens() {
    let document = parse(WEB_APP);
    assert_eq!(document.tokens.len(), document.spans.len());
    assert!(document.spans.iter().all(|s| s.end <= WEB_APP.len()));
}
