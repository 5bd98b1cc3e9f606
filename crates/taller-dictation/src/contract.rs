//! Extraction contracts: which endpoint and instructions each form uses.
//!
//! One contract per `FormContext`, defined statically so the table can be
//! inspected and tested independently of the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use taller_core::types::FormContext;

/// Default value of a field in the expected response shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Number(i64),
}

impl FieldDefault {
    fn to_value(self) -> Value {
        match self {
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Number(n) => Value::from(n),
        }
    }
}

/// How one form context is sent to the extraction service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContract {
    pub context: FormContext,
    /// Path relative to the API base URL.
    pub endpoint: &'static str,
    /// Instruction steering the remote extractor.
    pub system_message: Option<&'static str>,
    /// Expected output shape sent as `formato_respuesta`. Empty means none is sent.
    pub response_format: &'static [(&'static str, FieldDefault)],
    /// Fields the service is expected to return, dotted for nested sections.
    pub expected_fields: &'static [&'static str],
}

const DICTATION_ENDPOINT: &str = "ai/procesar-dictado";
const ORDER_DICTATION_ENDPOINT: &str = "ai/procesar-dictado-orden";

static CONTRACTS: [ExtractionContract; 5] = [
    ExtractionContract {
        context: FormContext::General,
        endpoint: DICTATION_ENDPOINT,
        system_message: None,
        response_format: &[],
        expected_fields: &[],
    },
    ExtractionContract {
        context: FormContext::Order,
        endpoint: ORDER_DICTATION_ENDPOINT,
        system_message: None,
        response_format: &[],
        expected_fields: &[
            "diagnostico",
            "fallas",
            "reparaciones",
            "repuestos",
            "observaciones",
        ],
    },
    ExtractionContract {
        context: FormContext::Vehicle,
        endpoint: DICTATION_ENDPOINT,
        system_message: None,
        response_format: &[],
        expected_fields: &[
            "cliente.nombre",
            "cliente.telefono",
            "cliente.empresa",
            "cliente.email",
            "cliente.direccion_fiscal",
            "cliente.tipo_documento",
            "cliente.prefijo_documento",
            "cliente.numero_documento",
            "vehiculo.matricula",
            "vehiculo.marca",
            "vehiculo.modelo",
            "vehiculo.año",
            "vehiculo.color",
            "vehiculo.kilometraje",
            "vehiculo.tipo_combustible",
        ],
    },
    ExtractionContract {
        context: FormContext::Mechanic,
        endpoint: DICTATION_ENDPOINT,
        system_message: Some(
            "Extrae información de mecánicos: nombre, especialidad, teléfono, WhatsApp, estado",
        ),
        response_format: &[
            ("nombre", FieldDefault::Text("")),
            ("especialidad", FieldDefault::Text("")),
            ("telefono", FieldDefault::Text("")),
            ("whatsapp", FieldDefault::Text("")),
            ("estado", FieldDefault::Text("disponible")),
        ],
        expected_fields: &["nombre", "especialidad", "telefono", "whatsapp", "estado"],
    },
    ExtractionContract {
        context: FormContext::Service,
        endpoint: DICTATION_ENDPOINT,
        system_message: Some(
            "Extrae información de servicios/repuestos: tipo, nombre, descripción, precio",
        ),
        response_format: &[
            ("tipo", FieldDefault::Text("servicio")),
            ("nombre", FieldDefault::Text("")),
            ("descripcion", FieldDefault::Text("")),
            ("precio", FieldDefault::Number(0)),
        ],
        expected_fields: &["tipo", "nombre", "descripcion", "precio"],
    },
];

/// Look up the contract for a form context.
pub fn contract_for(context: FormContext) -> &'static ExtractionContract {
    match context {
        FormContext::General => &CONTRACTS[0],
        FormContext::Order => &CONTRACTS[1],
        FormContext::Vehicle => &CONTRACTS[2],
        FormContext::Mechanic => &CONTRACTS[3],
        FormContext::Service => &CONTRACTS[4],
    }
}

impl ExtractionContract {
    /// The expected response shape as JSON, if this contract declares one.
    pub fn response_format_value(&self) -> Option<Map<String, Value>> {
        if self.response_format.is_empty() {
            return None;
        }
        Some(
            self.response_format
                .iter()
                .map(|(name, default)| (name.to_string(), default.to_value()))
                .collect(),
        )
    }

    /// Build the request body for `text`.
    pub fn request(&self, text: &str) -> ExtractionRequest {
        ExtractionRequest {
            texto: text.to_string(),
            tipo_formulario: Some(self.context),
            system_message: self.system_message.map(str::to_string),
            formato_respuesta: self.response_format_value(),
            contexto: None,
        }
    }
}

/// Request body accepted by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub texto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_formulario: Option<FormContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formato_respuesta: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexto: Option<String>,
}

impl ExtractionRequest {
    /// Attach free-form context for the extractor (e.g. the vehicle being edited).
    pub fn with_context(mut self, contexto: impl Into<String>) -> Self {
        self.contexto = Some(contexto.into());
        self
    }
}

/// Response body returned by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub datos: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_context_has_its_own_contract() {
        for ctx in FormContext::ALL {
            assert_eq!(contract_for(ctx).context, ctx);
        }
    }

    #[test]
    fn test_response_format_keys_are_expected_fields() {
        for ctx in FormContext::ALL {
            let contract = contract_for(ctx);
            for (name, _) in contract.response_format {
                assert!(
                    contract.expected_fields.contains(name),
                    "{} format declares unexpected field {}",
                    ctx,
                    name
                );
            }
        }
    }

    #[test]
    fn test_order_uses_dedicated_endpoint() {
        assert_eq!(contract_for(FormContext::Order).endpoint, "ai/procesar-dictado-orden");
        for ctx in [
            FormContext::General,
            FormContext::Vehicle,
            FormContext::Mechanic,
            FormContext::Service,
        ] {
            assert_eq!(contract_for(ctx).endpoint, "ai/procesar-dictado");
        }
    }

    #[test]
    fn test_mechanic_request_payload() {
        let body = serde_json::to_value(contract_for(FormContext::Mechanic).request("Juan Pérez"))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "texto": "Juan Pérez",
                "tipo_formulario": "mecanico",
                "system_message": "Extrae información de mecánicos: nombre, especialidad, teléfono, WhatsApp, estado",
                "formato_respuesta": {
                    "nombre": "",
                    "especialidad": "",
                    "telefono": "",
                    "whatsapp": "",
                    "estado": "disponible"
                }
            })
        );
    }

    #[test]
    fn test_service_format_has_numeric_price() {
        let format = contract_for(FormContext::Service)
            .response_format_value()
            .unwrap();
        assert_eq!(format["precio"], json!(0));
        assert_eq!(format["tipo"], json!("servicio"));
    }

    #[test]
    fn test_general_request_omits_optional_fields() {
        let body = serde_json::to_value(
            contract_for(FormContext::General)
                .request("texto libre")
                .with_context("vehiculo ABC123"),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({
                "texto": "texto libre",
                "tipo_formulario": "general",
                "contexto": "vehiculo ABC123"
            })
        );
    }

    #[test]
    fn test_response_defaults_when_fields_missing() {
        let resp: ExtractionResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.success);
        assert!(resp.datos.is_none());
        assert!(resp.error.is_none());

        let resp: ExtractionResponse =
            serde_json::from_value(json!({"success": true, "datos": {"nombre": "Juan"}}))
                .unwrap();
        assert!(resp.success);
        assert_eq!(resp.datos.unwrap()["nombre"], "Juan");
    }
}
