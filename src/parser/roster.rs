use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::models::{normalize_label, MemberList, Person, DEFAULT_ROLE};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#contentsMain table tr").expect("roster row selector"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("header cell selector"));
static DATA_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("data cell selector"));

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect()
}

/// Parse a roster page into a `MemberList`
///
/// Each row with data cells becomes one `Person`: role from the `<th>`
/// (defaulting to 委員), name from the first `<td>` with whitespace removed,
/// affiliation from the second `<td>` as written.
pub fn parse_member_list(markup: &str) -> MemberList {
    let document = Html::parse_document(markup);
    let mut members = Vec::new();

    for row in document.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&DATA_CELL).collect();
        let Some(name_cell) = cells.first() else {
            continue;
        };

        let role = row
            .select(&HEADER_CELL)
            .next()
            .map(|th| cell_text(th).trim().to_string())
            .filter(|role| !role.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());
        let name = normalize_label(&cell_text(*name_cell));
        let affiliation = cells.get(1).map(|td| cell_text(*td)).unwrap_or_default();

        members.push(Person::new(name, role, affiliation));
    }

    MemberList::new(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"<html><body><div id="contentsMain">
        <table>
          <tr><th>役職</th><td>氏名</td><td>所属</td></tr>
          <tr><th></th><td>山田　花子</td><td>X大学</td></tr>
          <tr><th>委員</th><td>鈴木 一郎</td><td>Y大学</td></tr>
          <tr><th>主査</th><td>佐藤次郎</td><td> Z研究所 教授</td></tr>
        </table>
        </div></body></html>"#;

    #[test]
    fn test_parse_member_list() {
        let list = parse_member_list(ROSTER);
        // The heading row also has data cells and is read like any other row
        assert_eq!(list.len(), 4);

        let yamada = &list.members[1];
        assert_eq!(yamada.name, "山田花子");
        assert_eq!(yamada.role, "委員");
        assert_eq!(yamada.affiliation, "X大学");
        assert_eq!(yamada.label, "山田花子委員");

        let suzuki = &list.members[2];
        assert_eq!(suzuki.name, "鈴木一郎");
        assert_eq!(suzuki.label, "鈴木一郎委員");

        let sato = &list.members[3];
        assert_eq!(sato.role, "主査");
        assert_eq!(sato.affiliation, " Z研究所 教授");
    }

    #[test]
    fn test_rows_without_data_cells_are_skipped() {
        let html = r#"<div id="contentsMain"><table>
            <tr><th>委員名簿</th></tr>
            <tr><td>山田花子</td><td>X大学</td></tr>
        </table></div>"#;
        let list = parse_member_list(html);

        assert_eq!(list.len(), 1);
        assert_eq!(list.members[0].role, "委員");
        assert!(list.working_group_order.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let first = parse_member_list(ROSTER);
        let second = parse_member_list(ROSTER);
        assert_ne!(first.members[1].id, second.members[1].id);
        assert_ne!(first.members[1].id, first.members[2].id);
    }

    #[test]
    fn test_tables_outside_content_are_ignored() {
        let html = r#"<table><tr><td>山田花子</td><td>X大学</td></tr></table>"#;
        assert!(parse_member_list(html).is_empty());
    }
}
