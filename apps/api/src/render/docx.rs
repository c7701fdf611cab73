//! Word document adapter: flushes `substitute::Rewrite`s into docx-rs objects.
//!
//! Visits body paragraphs and paragraphs inside table cells (nested tables
//! included). Paragraph ids are renumbered in document order so the same
//! template and data always serialize the same way.

use std::io::{Seek, Write};

use docx_rs::{
    read_docx, BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Run, RunChild,
    RunProperty, SpecialIndentType, Table, TableCellContent, TableChild, TableRowChild,
};

use crate::render::fields::TemplateData;
use crate::render::substitute::{rewrite_paragraph, Rewrite, Span};
use crate::render::RenderError;

/// Bullet paragraphs: wrapped lines start 0.25" in, under the item text.
pub const HANGING_INDENT: i32 = 360;

pub fn load(bytes: &[u8]) -> Result<Docx, RenderError> {
    read_docx(bytes).map_err(|e| RenderError::Load(e.to_string()))
}

pub fn save<W: Write + Seek>(docx: Docx, out: W) -> Result<(), RenderError> {
    docx.build()
        .pack(out)
        .map_err(|e| RenderError::Save(e.to_string()))
}

/// Substitutes template data into every paragraph. Returns the number of
/// paragraphs that were rewritten.
pub fn fill(docx: &mut Docx, data: &TemplateData) -> usize {
    let mut filler = Filler {
        data,
        next_id: 1,
        rewritten: 0,
    };
    let children = std::mem::take(&mut docx.document.children);
    docx.document.children = filler.document_children(children);
    filler.rewritten
}

struct Filler<'a> {
    data: &'a TemplateData,
    next_id: u32,
    rewritten: usize,
}

impl Filler<'_> {
    fn document_children(&mut self, children: Vec<DocumentChild>) -> Vec<DocumentChild> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                DocumentChild::Paragraph(p) => out.extend(
                    self.paragraph(*p)
                        .into_iter()
                        .map(|p| DocumentChild::Paragraph(Box::new(p))),
                ),
                DocumentChild::Table(t) => out.push(DocumentChild::Table(Box::new(self.table(*t)))),
                other => out.push(other),
            }
        }
        out
    }

    #[allow(irrefutable_let_patterns)]
    fn table(&mut self, mut table: Table) -> Table {
        for row in table.rows.iter_mut() {
            let TableChild::TableRow(row) = row else {
                continue;
            };
            for cell in row.cells.iter_mut() {
                let TableRowChild::TableCell(cell) = cell else {
                    continue;
                };
                let children = std::mem::take(&mut cell.children);
                cell.children = self.cell_children(children);
            }
        }
        table
    }

    fn cell_children(&mut self, children: Vec<TableCellContent>) -> Vec<TableCellContent> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                TableCellContent::Paragraph(p) => out.extend(
                    self.paragraph(*p)
                        .into_iter()
                        .map(|p| TableCellContent::Paragraph(Box::new(p))),
                ),
                TableCellContent::Table(t) => {
                    out.push(TableCellContent::Table(Box::new(self.table(*t))))
                }
                other => out.push(other),
            }
        }
        // Word rejects a cell without a paragraph.
        if out.is_empty() {
            let empty = self.numbered(Paragraph::new());
            out.push(TableCellContent::Paragraph(Box::new(empty)));
        }
        out
    }

    fn paragraph(&mut self, paragraph: Paragraph) -> Vec<Paragraph> {
        let spans: Vec<Span<RunProperty>> = paragraph
            .children
            .iter()
            .filter_map(|child| match child {
                ParagraphChild::Run(run) => Some(Span {
                    text: run_text(run),
                    style: run.run_property.clone(),
                }),
                _ => None,
            })
            .collect();

        let paragraphs = match rewrite_paragraph(&spans, self.data) {
            Rewrite::Unchanged => vec![paragraph],
            Rewrite::Inline(span) => {
                self.rewritten += 1;
                let mut p = paragraph;
                p.children
                    .retain(|child| !matches!(child, ParagraphChild::Run(_)));
                p.children.push(ParagraphChild::Run(Box::new(build_run(span))));
                vec![p]
            }
            Rewrite::Bullets(spans) => {
                self.rewritten += 1;
                spans
                    .into_iter()
                    .map(|span| bullet_paragraph(&paragraph, span))
                    .collect()
            }
        };

        paragraphs.into_iter().map(|p| self.numbered(p)).collect()
    }

    fn numbered(&mut self, mut paragraph: Paragraph) -> Paragraph {
        paragraph.id = format!("{:08X}", self.next_id);
        self.next_id += 1;
        paragraph
    }
}

/// Visible text of a run. Tabs and breaks map to `\t` and `\n`.
fn run_text(run: &Run) -> String {
    run.children
        .iter()
        .map(|child| match child {
            RunChild::Text(t) => t.text.as_str(),
            RunChild::Tab(_) => "\t",
            RunChild::Break(_) => "\n",
            _ => "",
        })
        .collect()
}

fn build_run(span: Span<RunProperty>) -> Run {
    let mut run = Run::new();
    run.run_property = span.style;
    for (i, line) in span.text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                run = run.add_tab();
            }
            if !piece.is_empty() {
                run = run.add_text(piece);
            }
        }
    }
    run
}

/// A copy of the placeholder paragraph (style, spacing) holding one bullet.
fn bullet_paragraph(template: &Paragraph, span: Span<RunProperty>) -> Paragraph {
    let mut paragraph = template.clone();
    paragraph.children = vec![ParagraphChild::Run(Box::new(build_run(span)))];
    paragraph.indent(
        Some(HANGING_INDENT),
        Some(SpecialIndentType::Hanging(HANGING_INDENT)),
        None,
        None,
    )
}

/// Text of every paragraph in document order, table cells included.
#[cfg(test)]
pub(crate) fn paragraph_texts(docx: &Docx) -> Vec<String> {
    fn para(p: &Paragraph, out: &mut Vec<String>) {
        out.push(
            p.children
                .iter()
                .filter_map(|c| match c {
                    ParagraphChild::Run(run) => Some(run_text(run)),
                    _ => None,
                })
                .collect(),
        );
    }

    #[allow(irrefutable_let_patterns)]
    fn table(t: &Table, out: &mut Vec<String>) {
        for row in &t.rows {
            let TableChild::TableRow(row) = row else {
                continue;
            };
            for cell in &row.cells {
                let TableRowChild::TableCell(cell) = cell else {
                    continue;
                };
                for child in &cell.children {
                    match child {
                        TableCellContent::Paragraph(p) => para(p, out),
                        TableCellContent::Table(t) => table(t, out),
                        _ => {}
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => para(p, &mut out),
            DocumentChild::Table(t) => table(t, &mut out),
            _ => {}
        }
    }
    out
}
