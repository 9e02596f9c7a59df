// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Mathematical Justification

//! Step-by-step derivation of a recommendation, rendered for the client's
//! "justificativa" panel.

use serde::{Deserialize, Serialize};

use crate::money::{format_decimal_comma, format_reais, Reais};
use crate::optimizer::Optimum;
use crate::types::{ExtrapolationLevel, OptimizationInput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub titulo: String,
    pub etapas: Vec<Step>,
    pub resultado_final: FinalResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub numero: u32,
    pub nome: String,
    pub descricao: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub detalhes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub investimento_recomendado: String,
    pub lucro_esperado: String,
    pub validacao: String,
    pub confiabilidade: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Alta,
    Moderada,
    Baixa,
}

impl Confidence {
    /// Poor calibration or high extrapolation both mean low confidence.
    pub fn assess(extrapolation: Option<ExtrapolationLevel>, poor_fit: bool) -> Self {
        if poor_fit {
            return Self::Baixa;
        }
        match extrapolation {
            Some(ExtrapolationLevel::High) => Self::Baixa,
            Some(ExtrapolationLevel::Moderate) => Self::Moderada,
            _ => Self::Alta,
        }
    }
}

fn sci(v: f64) -> String {
    format!("{:.3e}", v)
}

/// Builds the derivation from a verified optimum.
pub fn build(
    input: &OptimizationInput,
    optimum: &Optimum,
    extrapolation: Option<ExtrapolationLevel>,
    poor_fit: bool,
) -> Justification {
    let OptimizationInput { margin, elasticity: e, constant_k: k } = *input;
    let mut etapas = vec![
        Step {
            numero: 1,
            nome: "Modelo de resposta".to_string(),
            descricao: "As vendas respondem ao investimento em anúncios por uma lei de potência com retornos decrescentes.".to_string(),
            formula: Some("Q(A) = k · A^e".to_string()),
            detalhes: vec![
                format!("k = {}", format_decimal_comma(k, 4)),
                format!("e = {}", format_decimal_comma(e, 4)),
            ],
        },
        Step {
            numero: 2,
            nome: "Função lucro".to_string(),
            descricao: "Lucro líquido é a margem unitária vezes as vendas, menos o próprio investimento.".to_string(),
            formula: Some("L(A) = m · k · A^e − A".to_string()),
            detalhes: vec![format!("m = {}", format_reais(margin))],
        },
        Step {
            numero: 3,
            nome: "Condição de primeira ordem".to_string(),
            descricao: "No ponto ótimo o lucro marginal de mais um real investido é zero.".to_string(),
            formula: Some("L'(A) = m · k · e · A^(e−1) − 1 = 0".to_string()),
            detalhes: vec![format!("L'(A*) = {}", sci(optimum.first_derivative))],
        },
        Step {
            numero: 4,
            nome: "Solução analítica".to_string(),
            descricao: "Isolando A na condição de primeira ordem.".to_string(),
            formula: Some("A* = (m · k · e)^(1 / (1 − e))".to_string()),
            detalhes: vec![format!("A* = {}", format_reais(optimum.investment))],
        },
        Step {
            numero: 5,
            nome: "Condição de segunda ordem".to_string(),
            descricao: "A derivada segunda negativa confirma que A* é um máximo, não um mínimo.".to_string(),
            formula: Some("L''(A*) = m · k · e · (e − 1) · A*^(e−2) < 0".to_string()),
            detalhes: vec![format!("L''(A*) = {}", sci(optimum.second_derivative))],
        },
        Step {
            numero: 6,
            nome: "Teorema de Wright".to_string(),
            descricao: "No ótimo, o investimento é igual à elasticidade vezes o lucro bruto.".to_string(),
            formula: Some("A* = e · G(A*),  G(A) = m · k · A^e".to_string()),
            detalhes: vec![
                format!("G(A*) = {}", format_reais(optimum.gross_profit)),
                format!("e · G(A*) = {}", format_reais(e * optimum.gross_profit)),
                format!(
                    "A* representa {}% do lucro bruto",
                    format_decimal_comma(optimum.gross_profit_share_pct(), 1)
                ),
            ],
        },
    ];

    if let Some(level) = extrapolation {
        etapas.push(Step {
            numero: 7,
            nome: "Risco de extrapolação".to_string(),
            descricao: format!(
                "Comparação de A* com o maior investimento observado: {}.",
                level.description()
            ),
            formula: None,
            detalhes: Vec::new(),
        });
    }

    // Expected profit printed as gross minus spend in cents, so the three
    // amounts shown to the user reconcile exactly.
    let lucro_esperado = match (
        Reais::from_f64(optimum.gross_profit),
        Reais::from_f64(optimum.investment),
    ) {
        (Some(gross), Some(spend)) => (gross - spend).to_string(),
        _ => format_reais(optimum.profit),
    };

    let confiabilidade = Confidence::assess(extrapolation, poor_fit);
    Justification {
        titulo: "Otimização do orçamento de anúncios (Teorema de Wright)".to_string(),
        etapas,
        resultado_final: FinalResult {
            investimento_recomendado: format_reais(optimum.investment),
            lucro_esperado,
            validacao: format!(
                "Máximo confirmado: L''(A*) = {} < 0",
                sci(optimum.second_derivative)
            ),
            confiabilidade,
        },
    }
}
