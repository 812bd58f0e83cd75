use crate::error::{Result, ScrapeError};
use rego_core::{LabelValueField, PageLayout, VehicleRecord};
use scraper::{ElementRef, Html, Selector};

/// Extracts a [`VehicleRecord`] from the rendered results page.
pub struct ResultParser<'a> {
    layout: &'a PageLayout,
}

impl<'a> ResultParser<'a> {
    pub fn new(layout: &'a PageLayout) -> Self {
        Self { layout }
    }

    /// Parse the captured root markup.
    ///
    /// The invalid-registration marker is checked on the raw markup before
    /// any element is looked up.
    pub fn parse(&self, html: &str) -> Result<VehicleRecord> {
        if html.contains(&self.layout.invalid_marker) {
            return Err(ScrapeError::InvalidRegistration);
        }

        let document = Html::parse_document(html);
        let (model, vin) = self.parse_plate_detail(&document)?;
        let mut record = VehicleRecord::new(model, vin);

        let row_selector = compile(&self.layout.label_value_row)?;
        let column_selector = compile(&self.layout.value_column)?;
        let text_selector = compile(&self.layout.value_text)?;
        let rows: Vec<ElementRef> = document.select(&row_selector).collect();

        for entry in &self.layout.fields {
            let value = self
                .label_value(&rows, entry, &column_selector, &text_selector)?
                .unwrap_or_else(|| entry.fallback.clone());
            record.set(entry.field, value);
        }

        Ok(record)
    }

    fn parse_plate_detail(&self, document: &Html) -> Result<(String, String)> {
        let container_selector = compile(&self.layout.plate_detail)?;
        let item_selector = compile(&self.layout.detail_item)?;

        let container = document
            .select(&container_selector)
            .next()
            .ok_or_else(|| ScrapeError::missing(&self.layout.plate_detail, "no match"))?;
        let items: Vec<ElementRef> = container.select(&item_selector).collect();

        let item_text = |index: usize| {
            items.get(index).map(element_text).ok_or_else(|| {
                ScrapeError::missing(
                    format!(
                        "{} {}[{}]",
                        self.layout.plate_detail, self.layout.detail_item, index
                    ),
                    format!("only {} found", items.len()),
                )
            })
        };

        let model = item_text(self.layout.model_index)?;
        let vin = item_text(self.layout.vin_index)?
            .replacen(&self.layout.vin_label, "", 1)
            .trim()
            .to_string();

        Ok((model, vin))
    }

    /// Value text of one labelled row; `None` when the page left it empty.
    fn label_value(
        &self,
        rows: &[ElementRef],
        entry: &LabelValueField,
        column_selector: &Selector,
        text_selector: &Selector,
    ) -> Result<Option<String>> {
        let row = rows.get(entry.row).ok_or_else(|| {
            ScrapeError::missing(
                format!("{}[{}]", self.layout.label_value_row, entry.row),
                format!("only {} rows found", rows.len()),
            )
        })?;

        let column = row
            .select(column_selector)
            .nth(self.layout.value_column_index)
            .ok_or_else(|| {
                ScrapeError::missing(
                    format!(
                        "{}[{}] {}[{}]",
                        self.layout.label_value_row,
                        entry.row,
                        self.layout.value_column,
                        self.layout.value_column_index
                    ),
                    "no value column",
                )
            })?;

        Ok(column
            .select(text_selector)
            .next()
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty()))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::missing(selector, format!("invalid selector: {e}")))
}

/// Text as the page renders it: surrounding whitespace is not shown.
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
