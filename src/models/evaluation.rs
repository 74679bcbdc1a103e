use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Category weights must form a partition of unity within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationQuestion {
    pub key: String,
    pub label: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationCategory {
    pub key: String,
    pub label: String,
    pub weight: f64,
    pub questions: Vec<EvaluationQuestion>,
}

/// Fixed category/question structure shared by every performance report.
/// Loaded once at startup and passed by reference afterwards; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSchema {
    pub categories: Vec<EvaluationCategory>,
}

/// A question annotated with its owning category, in schema order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatQuestion {
    pub key: String,
    pub label: String,
    pub weight: u32,
    pub category_key: String,
    pub category_label: String,
}

impl EvaluationSchema {
    /// The built-in evaluation structure used by the product.
    pub fn builtin() -> &'static EvaluationSchema {
        &BUILTIN_SCHEMA
    }

    pub fn validate(&self) -> AppResult<()> {
        let mut weight_sum = 0.0;
        let mut seen_keys: Vec<&str> = Vec::new();

        for category in &self.categories {
            if category.weight < 0.0 {
                return Err(AppError::validation_with_details(
                    "评估体系配置无效: 分类权重不能为负",
                    serde_json::json!({ "categoryKey": category.key }),
                ));
            }
            weight_sum += category.weight;

            for question in &category.questions {
                if seen_keys.contains(&question.key.as_str()) {
                    return Err(AppError::validation_with_details(
                        "评估体系配置无效: 题目键重复",
                        serde_json::json!({ "questionKey": question.key }),
                    ));
                }
                seen_keys.push(&question.key);
            }
        }

        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::validation_with_details(
                "评估体系配置无效: 分类权重之和必须为 1.0",
                serde_json::json!({ "weightSum": weight_sum }),
            ));
        }

        Ok(())
    }

    pub fn category(&self, key: &str) -> Option<&EvaluationCategory> {
        self.categories.iter().find(|category| category.key == key)
    }

    /// All questions flattened in schema order, each annotated with its
    /// owning category key and label.
    pub fn all_questions(&self) -> Vec<FlatQuestion> {
        self.categories
            .iter()
            .flat_map(|category| {
                category.questions.iter().map(|question| FlatQuestion {
                    key: question.key.clone(),
                    label: question.label.clone(),
                    weight: question.weight,
                    category_key: category.key.clone(),
                    category_label: category.label.clone(),
                })
            })
            .collect()
    }
}

static BUILTIN_SCHEMA: Lazy<EvaluationSchema> = Lazy::new(|| EvaluationSchema {
    categories: vec![
        category(
            "commitment",
            "Comprometimento e Disciplina",
            0.30,
            vec![
                question("punctualityDeliveries", "Pontualidade nas Entregas", 3),
                question(
                    "punctualityRituals",
                    "Pontualidade em Rituais (Reuniões, Dailies)",
                    2,
                ),
                question("hybridModelAdherence", "Adesão ao Modelo Híbrido", 1),
            ],
        ),
        category(
            "technicalQuality",
            "Qualidade e Execução Técnica",
            0.40,
            vec![
                question(
                    "deliveryQuality",
                    "Qualidade das Entregas (código, poucos bugs)",
                    4,
                ),
                question("taskAutonomy", "Autonomia na Resolução de Tarefas", 3),
            ],
        ),
        category(
            "collaboration",
            "Colaboração e Proatividade",
            0.30,
            vec![
                question(
                    "proactivityImprovements",
                    "Proatividade e Sugestão de Melhorias",
                    3,
                ),
                question("communicationQuality", "Qualidade da Comunicação", 2),
                question("teamCollaboration", "Colaboração e Suporte à Equipe", 2),
            ],
        ),
    ],
});

fn category(
    key: &str,
    label: &str,
    weight: f64,
    questions: Vec<EvaluationQuestion>,
) -> EvaluationCategory {
    EvaluationCategory {
        key: key.to_string(),
        label: label.to_string(),
        weight,
        questions,
    }
}

fn question(key: &str, label: &str, weight: u32) -> EvaluationQuestion {
    EvaluationQuestion {
        key: key.to_string(),
        label: label.to_string(),
        weight,
    }
}
