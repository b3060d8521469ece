use crate::types::OrganizationSeedList;
use crate::Error;
use csv::{ReaderBuilder, StringRecord};
use std::io::{Cursor, Read};

pub struct OrganizationListPreprocessor {}

impl OrganizationListPreprocessor {
    pub fn read_organization_list_from_string(csv: &str) -> Result<OrganizationSeedList, Error> {
        Self::read_organization_list(Cursor::new(csv))
    }

    /// Parses seed rows with the headers `Id`, `Company Name`, `Symbol`, `Exchange`,
    /// `Industry`, `Alternate Names` and `Prior Names`.
    ///
    /// Only `Id` and `Company Name` are required columns. Alternate and prior names are
    /// comma-separated inside their (quoted) field.
    pub fn read_organization_list<R: Read>(reader: R) -> Result<OrganizationSeedList, Error> {
        let mut organization_list = OrganizationSeedList::new();

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::ParserError(format!("Failed to read headers: {}", e)))?
            .clone();

        let id_column = required_column(&headers, "Id")?;
        let name_column = required_column(&headers, "Company Name")?;
        let symbol_column = optional_column(&headers, "Symbol");
        let exchange_column = optional_column(&headers, "Exchange");
        let industry_column = optional_column(&headers, "Industry");
        let alternate_names_column = optional_column(&headers, "Alternate Names");
        let prior_names_column = optional_column(&headers, "Prior Names");

        for record in reader.records() {
            let record =
                record.map_err(|e| Error::ParserError(format!("Failed to read record: {}", e)))?;

            let id = record
                .get(id_column)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| Error::ParserError("Missing 'Id' field".to_string()))?;

            let company_name = record
                .get(name_column)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    Error::ParserError(format!("Missing 'Company Name' field for `{}`", id))
                })?;

            organization_list.push((
                id.to_string(),
                company_name.to_string(),
                non_empty_field(&record, symbol_column).map(|symbol| symbol.to_uppercase()),
                non_empty_field(&record, exchange_column),
                non_empty_field(&record, industry_column),
                split_names(&record, alternate_names_column),
                split_names(&record, prior_names_column),
            ));
        }

        Ok(organization_list)
    }
}

fn required_column(headers: &StringRecord, name: &str) -> Result<usize, Error> {
    optional_column(headers, name)
        .ok_or_else(|| Error::ParserError(format!("Missing '{}' column", name)))
}

fn optional_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn non_empty_field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|column| record.get(column))
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

fn split_names(record: &StringRecord, column: Option<usize>) -> Vec<String> {
    match non_empty_field(record, column) {
        Some(names) => names
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        None => Vec::new(),
    }
}
