//! Where each field sits on the C&R sales-order form.
//!
//! Boxes are fractions of the normalized page and were tuned against the
//! printed form; a new form revision means new constants here.

use serde::{Deserialize, Serialize};

use crate::profile::FieldType;

/// A pixel rectangle on the normalized page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamp into a `width`×`height` image; the result is at least 1×1.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let x = self.x.min(width.saturating_sub(1));
        let y = self.y.min(height.saturating_sub(1));
        Self {
            x,
            y,
            width: self.width.clamp(1, (width - x).max(1)),
            height: self.height.clamp(1, (height - y).max(1)),
        }
    }

    /// Grow by `pad` pixels on every side, staying inside the image.
    pub fn padded(self, pad: u32, width: u32, height: u32) -> Self {
        let x = self.x.saturating_sub(pad);
        let y = self.y.saturating_sub(pad);
        Self {
            x,
            y,
            width: (self.width + pad * 2).min(width.saturating_sub(x)).max(1),
            height: (self.height + pad * 2).min(height.saturating_sub(y)).max(1),
        }
    }
}

/// The fields printed on the form, in the order they appear in the labeled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    InvoiceNumber,
    SoldTo,
    Directions,
    Email,
    Date,
    HomePhone,
    CellPhone,
    InstallationDate,
    InstalledBy,
    Salesperson,
    Manufacturer,
    Size,
    Style,
    Color,
    Pad,
    RugPad,
    UnitAmountBlock,
    TotalsBlock,
}

struct Layout {
    field: FormField,
    key: &'static str,
    label: &'static str,
    field_type: FieldType,
    // x, y, w, h as fractions of the page
    frac: [f32; 4],
}

const LAYOUT: [Layout; 18] = [
    Layout { field: FormField::InvoiceNumber, key: "invoice_number", label: "INVOICE # CR", field_type: FieldType::Numeric, frac: [0.64, 0.01, 0.34, 0.09] },
    Layout { field: FormField::SoldTo, key: "sold_to", label: "Sold to", field_type: FieldType::Text, frac: [0.05, 0.16, 0.43, 0.13] },
    Layout { field: FormField::Directions, key: "directions", label: "Directions", field_type: FieldType::Text, frac: [0.52, 0.16, 0.43, 0.13] },
    Layout { field: FormField::Email, key: "email", label: "Customer Email", field_type: FieldType::Email, frac: [0.52, 0.275, 0.43, 0.05] },
    Layout { field: FormField::Date, key: "date", label: "Date", field_type: FieldType::Date, frac: [0.05, 0.315, 0.10, 0.055] },
    Layout { field: FormField::HomePhone, key: "home_phone", label: "Home Phone", field_type: FieldType::Phone, frac: [0.15, 0.315, 0.18, 0.055] },
    Layout { field: FormField::CellPhone, key: "cell_phone", label: "Cell Phone", field_type: FieldType::Phone, frac: [0.33, 0.315, 0.16, 0.055] },
    Layout { field: FormField::InstallationDate, key: "installation_date", label: "Installation Date", field_type: FieldType::Date, frac: [0.49, 0.315, 0.18, 0.055] },
    Layout { field: FormField::InstalledBy, key: "installed_by", label: "Installed By", field_type: FieldType::Text, frac: [0.68, 0.315, 0.14, 0.055] },
    Layout { field: FormField::Salesperson, key: "salesperson", label: "Salesperson", field_type: FieldType::Text, frac: [0.82, 0.315, 0.14, 0.055] },
    Layout { field: FormField::Manufacturer, key: "manufacturer", label: "Manufacturer", field_type: FieldType::Text, frac: [0.15, 0.365, 0.52, 0.045] },
    Layout { field: FormField::Size, key: "size", label: "Size", field_type: FieldType::Text, frac: [0.15, 0.410, 0.52, 0.045] },
    Layout { field: FormField::Style, key: "style", label: "Style", field_type: FieldType::Text, frac: [0.15, 0.455, 0.52, 0.045] },
    Layout { field: FormField::Color, key: "color", label: "Color", field_type: FieldType::Text, frac: [0.15, 0.500, 0.52, 0.045] },
    Layout { field: FormField::Pad, key: "pad", label: "Pad", field_type: FieldType::Text, frac: [0.15, 0.545, 0.52, 0.045] },
    Layout { field: FormField::RugPad, key: "rug_pad", label: "Rug Pad", field_type: FieldType::Text, frac: [0.15, 0.590, 0.52, 0.045] },
    Layout { field: FormField::UnitAmountBlock, key: "unit_amount_block", label: "Unit/Amount Block", field_type: FieldType::Numeric, frac: [0.67, 0.355, 0.30, 0.26] },
    Layout { field: FormField::TotalsBlock, key: "totals_block", label: "Totals Block", field_type: FieldType::Numeric, frac: [0.70, 0.695, 0.28, 0.255] },
];

impl FormField {
    pub const ALL: [FormField; 18] = [
        FormField::InvoiceNumber,
        FormField::SoldTo,
        FormField::Directions,
        FormField::Email,
        FormField::Date,
        FormField::HomePhone,
        FormField::CellPhone,
        FormField::InstallationDate,
        FormField::InstalledBy,
        FormField::Salesperson,
        FormField::Manufacturer,
        FormField::Size,
        FormField::Style,
        FormField::Color,
        FormField::Pad,
        FormField::RugPad,
        FormField::UnitAmountBlock,
        FormField::TotalsBlock,
    ];

    fn layout(self) -> &'static Layout {
        // LAYOUT is declared in enum order.
        &LAYOUT[self as usize]
    }

    /// snake_case name used in logs and metadata.
    pub fn key(self) -> &'static str {
        self.layout().key
    }

    /// Label written in front of the value in the labeled block.
    pub fn label(self) -> &'static str {
        self.layout().label
    }

    pub fn field_type(self) -> FieldType {
        self.layout().field_type
    }

    /// Pixel box for this field on a `width`×`height` page.
    pub fn region(self, width: u32, height: u32) -> RegionBox {
        let [fx, fy, fw, fh] = self.layout().frac;
        let scale = |f: f32, dim: u32| (f * dim as f32).round() as u32;
        RegionBox::new(scale(fx, width), scale(fy, height), scale(fw, width), scale(fh, height))
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Every field with its box on a `width`×`height` page, in canonical order.
pub fn regions_for(width: u32, height: u32) -> Vec<(FormField, RegionBox)> {
    FormField::ALL
        .iter()
        .map(|&f| (f, f.region(width, height)))
        .collect()
}
