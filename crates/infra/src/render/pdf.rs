//! A4 "TAX INVOICE" layout rendered with `printpdf` builtin fonts.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};

use gstledger_invoicing::{Invoice, SupplyKind};
use gstledger_parties::Party;

use super::{InvoiceRenderer, RenderError, money, quantity};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const LEFT: f32 = 10.0;
const RIGHT: f32 = 200.0;
const TOP: f32 = 285.0;
const BOTTOM: f32 = 25.0;
const ROW_H: f32 = 7.0;
const LAYER: &str = "Layer 1";
const DESC_MAX_CHARS: usize = 44;

/// Item table columns: (header, x position in mm).
const COLUMNS: [(&str, f32); 6] = [
    ("Description", LEFT),
    ("HSN/SAC", 92.0),
    ("Qty", 112.0),
    ("Rate", 127.0),
    ("Taxable", 150.0),
    ("Total", 175.0),
];

/// Writes `{output_dir}/{invoice_number}.pdf`.
#[derive(Debug, Clone)]
pub struct PdfInvoiceRenderer {
    output_dir: PathBuf,
}

impl PdfInvoiceRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, invoice: &Invoice) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", invoice.number()))
    }

    /// Render the document in memory.
    pub fn render_bytes(&self, seller: &Party, invoice: &Invoice) -> Result<Vec<u8>, RenderError> {
        let buyer = invoice
            .buyer()
            .ok_or_else(|| RenderError::NotIssued(invoice.number().to_string()))?;

        let (doc, page, layer) = PdfDocument::new(
            format!("Tax Invoice {}", invoice.number()),
            Mm(PAGE_W),
            Mm(PAGE_H),
            LAYER,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        let mut cursor = Cursor {
            layer: doc.get_page(page).get_layer(layer),
            doc: &doc,
            y: TOP,
            regular,
            bold,
        };

        // Header
        cursor.text_bold("TAX INVOICE", 16.0, 85.0);
        cursor.advance(10.0);
        cursor.text_bold(&seller.name, 12.0, LEFT);
        cursor.text_bold(&format!("Invoice No: {}", invoice.number()), 11.0, 130.0);
        cursor.advance(6.0);
        cursor.text(&format!("GSTIN: {}", seller.gstin), 10.0, LEFT);
        cursor.text(&format!("Date: {}", invoice.issue_date()), 10.0, 130.0);
        cursor.advance(5.0);
        cursor.text(&seller.address, 10.0, LEFT);
        cursor.text(&format!("Due Date: {}", invoice.due_date()), 10.0, 130.0);
        cursor.advance(5.0);
        cursor.text(&format!("Category: {}", invoice.category()), 10.0, 130.0);
        cursor.advance(4.0);
        cursor.rule();

        // Buyer
        cursor.advance(9.0);
        cursor.text_bold("Bill To:", 10.0, LEFT);
        cursor.advance(5.0);
        cursor.text(&buyer.name, 10.0, LEFT);
        cursor.advance(5.0);
        cursor.text(&format!("GSTIN: {}", buyer.gstin), 10.0, LEFT);
        cursor.advance(5.0);
        cursor.text(&buyer.address, 10.0, LEFT);
        cursor.advance(5.0);
        cursor.text(&format!("Place of Supply: {}", buyer.state_code()), 10.0, LEFT);

        // Items
        cursor.advance(10.0);
        cursor.table_header();
        for item in invoice.items() {
            if cursor.needs_page(ROW_H) {
                cursor.new_page();
                cursor.table_header();
            }
            let desc: String = item.description.chars().take(DESC_MAX_CHARS).collect();
            let cells = [
                desc,
                item.hsn_sac.clone(),
                quantity(item.quantity),
                money(item.rate),
                money(item.taxable_value),
                money(item.total),
            ];
            for ((_, x), cell) in COLUMNS.iter().zip(cells.iter()) {
                cursor.text(cell, 9.0, *x);
            }
            cursor.advance(ROW_H);
        }
        cursor.rule();

        // Totals
        let split = invoice.split_totals();
        let mut totals = vec![("Total Taxable Value:", money(invoice.total_taxable()))];
        match invoice.supply() {
            SupplyKind::Intrastate => {
                totals.push(("CGST:", money(split.cgst)));
                totals.push(("SGST:", money(split.sgst)));
            }
            SupplyKind::Interstate => totals.push(("IGST:", money(split.igst))),
        }
        totals.push(("Total Tax (GST):", money(invoice.total_tax())));

        if cursor.needs_page(ROW_H * (totals.len() as f32 + 3.0)) {
            cursor.new_page();
        }
        cursor.advance(8.0);
        for (label, value) in &totals {
            cursor.text_bold(label, 10.0, 120.0);
            cursor.text(value, 10.0, 170.0);
            cursor.advance(ROW_H);
        }
        cursor.advance(2.0);
        cursor.text_bold("GRAND TOTAL:", 12.0, 120.0);
        cursor.text_bold(&format!("INR {}", money(invoice.grand_total())), 12.0, 160.0);
        cursor.advance(10.0);
        cursor.text(&format!("Status: {}", invoice.status()), 9.0, LEFT);

        drop(cursor);
        let mut writer = BufWriter::new(Vec::<u8>::new());
        doc.save(&mut writer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| RenderError::Pdf(e.to_string()))
    }
}

impl InvoiceRenderer for PdfInvoiceRenderer {
    fn render(&self, seller: &Party, invoice: &Invoice) -> Result<PathBuf, RenderError> {
        let bytes = self.render_bytes(seller, invoice)?;
        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.path_for(invoice);
        fs::write(&path, bytes).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(invoice = %invoice.number(), path = %path.display(), "invoice pdf written");
        Ok(path)
    }
}

/// Current drawing position; `y` counts down from the top margin.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Cursor<'_> {
    fn text(&self, text: &str, size: f32, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.regular);
    }

    fn text_bold(&self, text: &str, size: f32, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.bold);
    }

    fn rule(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(self.y)), false),
                (Point::new(Mm(RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn needs_page(&self, height: f32) -> bool {
        self.y - height < BOTTOM
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn table_header(&mut self) {
        for (title, x) in COLUMNS {
            self.text_bold(title, 9.0, x);
        }
        self.advance(2.5);
        self.rule();
        self.advance(ROW_H - 2.5);
    }
}
