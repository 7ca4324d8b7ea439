//! Prospect records as Prospector returns them, and their fixed mapping onto
//! CRM contacts and leads.

use crate::settings::Crm;
use crate::storage::{NewContact, NewLead, OrgNumberField};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub vat_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub post_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub organisation_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employees: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub turn_over: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub legal_entity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// Prospector sends some numeric columns as numbers and others as strings.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    })
}

/// Field layout of contacts and leads, fixed at startup.
#[derive(Debug, Clone)]
pub struct RecordDefaults {
    pub contact_org_number_field: Option<String>,
    pub contact_lang: String,
    pub lead_country_id: i64,
    pub lead_stage_id: i64,
    pub lead_referred: String,
}

impl From<&Crm> for RecordDefaults {
    fn from(crm: &Crm) -> Self {
        Self {
            contact_org_number_field: crm.contact_org_number_field.clone(),
            contact_lang: crm.contact_lang.clone(),
            lead_country_id: crm.lead_country_id,
            lead_stage_id: crm.lead_stage_id,
            lead_referred: crm.lead_referred.clone(),
        }
    }
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self::from(&Crm::default())
    }
}

impl Prospect {
    pub fn to_contact(&self, company_id: Option<i64>, defaults: &RecordDefaults) -> NewContact {
        NewContact {
            company_id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            vat: self.vat_number.clone(),
            street: self.address.clone(),
            zip: self.post_code.clone(),
            city: self.city.clone(),
            commercial_company_name: self.name.clone(),
            lang: defaults.contact_lang.clone(),
            organisation_number: defaults
                .contact_org_number_field
                .as_ref()
                .map(|key| OrgNumberField {
                    key: key.clone(),
                    value: self.organisation_number.clone(),
                }),
        }
    }

    pub fn to_lead(&self, company_id: Option<i64>, defaults: &RecordDefaults) -> NewLead {
        NewLead {
            company_id,
            name: self.name.clone(),
            partner_name: self.name.clone(),
            phone_sanitized: self.phone.clone(),
            phone: self.phone.clone(),
            company_vat_number: self.vat_number.clone(),
            company_organisation_number: self.organisation_number.clone(),
            company_employees: self.employees.clone(),
            company_turnover: self.turn_over.clone(),
            company_legal_entity: self.legal_entity.clone(),
            street: self.address.clone(),
            zip: self.post_code.clone(),
            city: self.city.clone(),
            country_id: defaults.lead_country_id,
            stage_id: defaults.lead_stage_id,
            referred: defaults.lead_referred.clone(),
            description: self.lead_description(),
        }
    }

    /// HTML summary stored on the lead.
    pub fn lead_description(&self) -> String {
        let rows = [
            ("Name", Some(self.name.as_str())),
            ("Organisation Number", self.organisation_number.as_deref()),
            ("Beskrivning", self.description.as_deref()),
            ("Anställda", self.employees.as_deref()),
            ("Omsättning", self.turn_over.as_deref()),
            ("Bolagsform", self.legal_entity.as_deref()),
            ("VAT Number", self.vat_number.as_deref()),
        ];

        let mut html = String::from(
            "<h3>Extra information</h3>\n\
             <table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n\
             <tr><th>Kategori</th><th>Information</th></tr>\n",
        );
        for (label, value) in rows {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                label,
                escape_html(value.unwrap_or(""))
            ));
        }
        html.push_str("</table>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Prospect {
        serde_json::from_value(json!({
            "name": "Tech Solutions AB",
            "phone": "+46 8 123 45",
            "vatNumber": "SE556677889901",
            "address": "Kungsgatan 12",
            "postCode": "111 43",
            "city": "Stockholm",
            "organisationNumber": "556677-8899",
            "employees": 150,
            "turnOver": "45000000",
            "legalEntity": "Aktiebolag",
            "description": "Software & <consulting>"
        }))
        .expect("prospect")
    }

    #[test]
    fn test_numeric_fields_become_text() {
        let p = sample();
        assert_eq!(p.employees.as_deref(), Some("150"));
        assert_eq!(p.turn_over.as_deref(), Some("45000000"));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let p: Prospect = serde_json::from_value(json!({ "name": "Solo AB", "phone": null }))
            .expect("prospect");
        assert_eq!(p.phone, None);
        assert_eq!(p.city, None);
    }

    #[test]
    fn test_contact_mapping_without_org_field() {
        let contact = sample().to_contact(Some(1), &RecordDefaults::default());

        assert_eq!(contact.company_id, Some(1));
        assert_eq!(contact.name, "Tech Solutions AB");
        assert_eq!(contact.commercial_company_name, "Tech Solutions AB");
        assert_eq!(contact.vat.as_deref(), Some("SE556677889901"));
        assert_eq!(contact.street.as_deref(), Some("Kungsgatan 12"));
        assert_eq!(contact.zip.as_deref(), Some("111 43"));
        assert_eq!(contact.lang, "en_US");
        assert!(contact.organisation_number.is_none());
    }

    #[test]
    fn test_contact_mapping_with_org_field() {
        let defaults = RecordDefaults {
            contact_org_number_field: Some("x_org_number".to_string()),
            ..RecordDefaults::default()
        };
        let contact = sample().to_contact(None, &defaults);

        let field = contact.organisation_number.expect("org field");
        assert_eq!(field.key, "x_org_number");
        assert_eq!(field.value.as_deref(), Some("556677-8899"));
    }

    #[test]
    fn test_lead_mapping() {
        let lead = sample().to_lead(Some(2), &RecordDefaults::default());

        assert_eq!(lead.partner_name, "Tech Solutions AB");
        assert_eq!(lead.phone_sanitized, lead.phone);
        assert_eq!(lead.company_organisation_number.as_deref(), Some("556677-8899"));
        assert_eq!(lead.company_employees.as_deref(), Some("150"));
        assert_eq!(lead.country_id, 196);
        assert_eq!(lead.stage_id, 1);
        assert_eq!(lead.referred, "BizMatch");
    }

    #[test]
    fn test_lead_description_escapes_values() {
        let html = sample().lead_description();

        assert!(html.starts_with("<h3>Extra information</h3>"));
        assert!(html.contains("<tr><td>Organisation Number</td><td>556677-8899</td></tr>"));
        assert!(html.contains("Software &amp; &lt;consulting&gt;"));
        assert!(html.trim_end().ends_with("</table>"));
    }
}
