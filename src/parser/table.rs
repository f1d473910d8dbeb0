//! Pipe-table assembly (spec C6 priority 6), called from
//! [`crate::parser::block`] once it has matched a header line followed
//! by a valid delimiter row. Column count and alignment come from the
//! delimiter row; every row after it is clipped or padded to that
//! count, same as [`crate::scanners::table_row_cells`] already does
//! for a single line — this module just repeats that per row and
//! wraps the result in the table/row/cell node shape.

use crate::nodes::{Cursor, DepthExceeded, NodeTable, NodeTableCell, NodeValue, TableAlign};
use crate::parser::block::BlockParser;
use crate::scanners;
use crate::strings::trim_slice;

pub fn parse_table<'a, 'r>(
    block: &BlockParser<'r>,
    cursor: &Cursor<'a>,
    lines: &[&[u8]],
    i: usize,
    aligns: Vec<TableAlign>,
) -> Result<usize, DepthExceeded> {
    let columns = aligns.len();
    let table_node = cursor.push(NodeValue::TableBlock(NodeTable { columns }), 0)?;

    let header_node = cursor.push(NodeValue::TableHeader, 0)?;
    emit_row(block, cursor, lines[i], &aligns, true)?;
    cursor.pop(header_node);

    let body_node = cursor.push(NodeValue::TableBody, 0)?;
    let mut j = i + 2; // skip header line and delimiter row
    while j < lines.len() {
        let line = lines[j];
        if crate::strings::is_blank(line) {
            break;
        }
        let cells = scanners::table_row_cells(line);
        if cells.is_empty() {
            break;
        }
        emit_row(block, cursor, line, &aligns, false)?;
        j += 1;
    }
    cursor.pop(body_node);

    cursor.pop(table_node);
    Ok(j)
}

fn emit_row<'a, 'r>(
    block: &BlockParser<'r>,
    cursor: &Cursor<'a>,
    line: &[u8],
    aligns: &[TableAlign],
    is_header: bool,
) -> Result<(), DepthExceeded> {
    let row_node = cursor.push(NodeValue::TableRow, 0)?;
    let cells = scanners::table_row_cells(line);

    for (col, align) in aligns.iter().enumerate() {
        let mut cell_align = *align;
        if is_header {
            cell_align |= TableAlign::HEADER;
        }
        let cell_node = cursor.push(
            NodeValue::TableCell(NodeTableCell {
                col,
                align: cell_align,
            }),
            0,
        )?;
        if let Some(raw) = cells.get(col) {
            block.inline(cursor, trim_slice(raw))?;
        }
        cursor.pop(cell_node);
    }

    cursor.pop(row_node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetaEntry;
    use crate::nodes::{Ast, AstNode};
    use crate::parser::options::Features;
    use crate::reference::{FootnoteList, RefMap};
    use std::cell::RefCell;

    #[test]
    fn single_column_table() {
        let arena = typed_arena::Arena::new();
        let root: &AstNode = arena.alloc(crate::arena_tree::Node::new(RefCell::new(Ast {
            id: 0,
            value: NodeValue::Root,
            start_line: 1,
        })));
        let cursor = Cursor::new(&arena, root, 0);
        let refs = RefMap::default();
        let footnotes = FootnoteList::default();
        let meta: Vec<MetaEntry> = Vec::new();
        let block = BlockParser::new(&refs, &footnotes, &meta, Features::default());

        let lines: Vec<&[u8]> = vec![b"| h |", b"|---|", b"| v |"];
        let consumed = parse_table(
            &block,
            &cursor,
            &lines,
            0,
            vec![TableAlign::empty()],
        )
        .unwrap();
        assert_eq!(consumed, 3);

        let table = root.children().next().unwrap();
        match &table.data.borrow().value {
            NodeValue::TableBlock(t) => assert_eq!(t.columns, 1),
            _ => panic!("expected TableBlock"),
        }
    }
}
