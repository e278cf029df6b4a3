//! Plain-text rendering of conversation turns for the terminal.

use filebot_shared::{NodeKind, ResultList, Speaker, Turn, TurnContent};

/// Render one turn as the lines the REPL prints.
pub(crate) fn render_turn(turn: &Turn) -> String {
    let prefix = match turn.speaker {
        Speaker::User => "you",
        Speaker::Agent => "bot",
    };

    match &turn.content {
        TurnContent::Text { text } => format!("{prefix}> {text}"),
        TurnContent::Results { list } => format!("{prefix}> {}", render_list(list)),
        TurnContent::Download { link } => format!("{prefix}> {} ({})", link.name, link.url),
        TurnContent::Image { name, mime, data } => {
            format!("{prefix}> [image {name}, {mime}, {} bytes base64]", data.len())
        }
        TurnContent::Pdf { name, data } => {
            format!("{prefix}> [pdf {name}, {} bytes base64]", data.len())
        }
    }
}

fn render_list(list: &ResultList) -> String {
    let mut out = list.caption().to_string();
    for (i, item) in list.items().iter().enumerate() {
        let marker = match item.kind() {
            NodeKind::Folder => "/",
            NodeKind::File => "",
        };
        out.push_str(&format!("\n  [{}] {}{marker}", i + 1, item.name()));
        if let Some(snippet) = item.matched_content() {
            out.push_str(&format!("\n      {snippet}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use filebot_shared::{DirectoryEntry, DownloadLink, SearchHit};

    #[test]
    fn numbers_result_items_from_one() {
        let list = ResultList::new(
            "Contents of \"docs\":",
            [
                DirectoryEntry {
                    path: "docs/api".into(),
                    name: "api".into(),
                    kind: NodeKind::Folder,
                },
                DirectoryEntry {
                    path: "docs/readme.md".into(),
                    name: "readme.md".into(),
                    kind: NodeKind::File,
                },
            ],
        )
        .unwrap();

        let out = render_turn(&Turn::agent_results(list));
        assert_eq!(
            out,
            "bot> Contents of \"docs\":\n  [1] api/\n  [2] readme.md"
        );
    }

    #[test]
    fn snippets_follow_their_hit() {
        let list = ResultList::new(
            "Search results for \"q3\":",
            [SearchHit {
                path: "finance/q3.txt".into(),
                name: "q3.txt".into(),
                kind: NodeKind::File,
                matched_content: Some("<mark>Q3</mark> totals".into()),
            }],
        )
        .unwrap();

        let out = render_turn(&Turn::agent_results(list));
        assert!(out.ends_with("[1] q3.txt\n      <mark>Q3</mark> totals"));
    }

    #[test]
    fn speakers_and_links() {
        assert_eq!(render_turn(&Turn::user_text("hello")), "you> hello");
        let link = DownloadLink {
            name: "a.pdf".into(),
            url: "http://x/download/?path=a.pdf".into(),
        };
        assert_eq!(
            render_turn(&Turn::agent_download(link)),
            "bot> a.pdf (http://x/download/?path=a.pdf)"
        );
    }
}
