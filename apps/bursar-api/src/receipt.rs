//! Receipt PDF rendering.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ School name                  │ School name                  │
//! │ Fee Payment Receipt          │ Fee Payment Receipt          │
//! │                              │                              │
//! │ Receipt Number: REC000042    │ Receipt Number: REC000042    │
//! │ Student Name: ...            │ Student Name: ...            │
//! │ ...                          │ ...                          │
//! │ Thank you for your payment.  │ Thank you for your payment.  │
//! └──────────────────────────────┴──────────────────────────────┘
//!            office copy                  student copy
//! ```
//!
//! The paired layout is landscape A4; the single copy is portrait A4.
//! Only builtin fonts are used, so amounts print with "Rs." rather than
//! the rupee sign.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};

use bursar_core::ReceiptDetails;

const A4_LONG: f32 = 297.0;
const A4_SHORT: f32 = 210.0;
const MARGIN: f32 = 18.0;
const LINE_GAP: f32 = 7.0;

/// Receipt rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

fn pdf_error(err: printpdf::Error) -> RenderError {
    RenderError::Pdf(format!("{err:?}"))
}

/// The body lines of a receipt, top to bottom.
pub fn receipt_lines(receipt: &ReceiptDetails) -> Vec<String> {
    vec![
        format!("Receipt Number: {}", receipt.receipt_number),
        format!("Student Name: {}", receipt.student_name),
        format!("Class: {}", receipt.class_description),
        format!("Fee Type: {}", receipt.fee_type),
        format!("Payment Mode: {}", receipt.payment_mode),
        format!("Amount Paid: Rs. {}", receipt.amount_paid()),
        format!("Total Fee: Rs. {}", receipt.total_amount()),
        format!("Payment Date: {}", receipt.payment_date.format("%d/%m/%Y")),
    ]
}

/// Renders receipts for one school.
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    school_name: String,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl ReceiptRenderer {
    pub fn new(school_name: impl Into<String>) -> Self {
        ReceiptRenderer {
            school_name: school_name.into(),
        }
    }

    /// Two identical copies side by side on landscape A4.
    pub fn render_pair(&self, receipt: &ReceiptDetails) -> Result<Vec<u8>, RenderError> {
        let title = format!("Receipt {}", receipt.receipt_number);
        let (doc, page, layer) = PdfDocument::new(&title, Mm(A4_LONG), Mm(A4_SHORT), "Layer 1");
        let fonts = load_fonts(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        let top = A4_SHORT - MARGIN;
        let half = A4_LONG / 2.0;
        self.draw_copy(&layer, &fonts, receipt, MARGIN, top);
        self.draw_copy(&layer, &fonts, receipt, half + MARGIN, top);

        // Cut line between the two copies.
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(half), Mm(MARGIN)), false),
                (Point::new(Mm(half), Mm(A4_SHORT - MARGIN)), false),
            ],
            is_closed: false,
        });

        doc.save_to_bytes().map_err(pdf_error)
    }

    /// A single copy on portrait A4.
    pub fn render_single(&self, receipt: &ReceiptDetails) -> Result<Vec<u8>, RenderError> {
        let title = format!("Receipt {}", receipt.receipt_number);
        let (doc, page, layer) = PdfDocument::new(&title, Mm(A4_SHORT), Mm(A4_LONG), "Layer 1");
        let fonts = load_fonts(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        self.draw_copy(&layer, &fonts, receipt, MARGIN + 7.0, A4_LONG - MARGIN - 10.0);

        doc.save_to_bytes().map_err(pdf_error)
    }

    fn draw_copy(
        &self,
        layer: &PdfLayerReference,
        fonts: &Fonts,
        receipt: &ReceiptDetails,
        x: f32,
        top: f32,
    ) {
        layer.use_text(self.school_name.as_str(), 15.0, Mm(x), Mm(top), &fonts.bold);
        layer.use_text("Fee Payment Receipt", 10.0, Mm(x), Mm(top - 8.0), &fonts.regular);

        let mut y = top - 22.0;
        for line in receipt_lines(receipt) {
            layer.use_text(line, 12.0, Mm(x), Mm(y), &fonts.regular);
            y -= LINE_GAP;
        }

        layer.use_text(
            "Thank you for your payment.",
            12.0,
            Mm(x),
            Mm(y - LINE_GAP),
            &fonts.regular,
        );
    }
}

fn load_fonts(doc: &PdfDocumentReference) -> Result<Fonts, RenderError> {
    Ok(Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> ReceiptDetails {
        ReceiptDetails {
            payment_id: 42,
            receipt_number: "REC000042".to_string(),
            payment_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
            payment_mode: "Cash".to_string(),
            amount_paid_cents: 250_050,
            fee_type: "Annual Fee".to_string(),
            total_amount_cents: 500_000,
            student_name: "Asha Rao".to_string(),
            class_description: "Class 5".to_string(),
        }
    }

    #[test]
    fn test_receipt_lines() {
        let lines = receipt_lines(&sample());
        assert_eq!(lines[0], "Receipt Number: REC000042");
        assert_eq!(lines[1], "Student Name: Asha Rao");
        assert_eq!(lines[5], "Amount Paid: Rs. 2500.50");
        assert_eq!(lines[6], "Total Fee: Rs. 5000.00");
        assert_eq!(lines[7], "Payment Date: 03/04/2024");
    }

    #[test]
    fn test_render_pair_is_pdf() {
        let bytes = ReceiptRenderer::new("Hill School")
            .render_pair(&sample())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_single_is_pdf() {
        let bytes = ReceiptRenderer::new("Hill School")
            .render_single(&sample())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
