//! Static descriptors for the contact form.
//!
//! Pure configuration: field order, option ids and labels are stable and
//! consumed by whatever renders the form. The only behavior here is mapping
//! selected option ids back to their labels for a submission.

use crate::types::Questionnaire;

/// A free-text field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub key: &'static str,
}

/// One selectable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: u32,
    pub label: &'static str,
}

/// A radio or checkbox group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceGroup {
    pub title: &'static str,
    pub name: &'static str,
    pub choices: &'static [Choice],
}

impl ChoiceGroup {
    pub fn label(&self, id: u32) -> Option<&'static str> {
        self.choices
            .iter()
            .find(|choice| choice.id == id)
            .map(|choice| choice.label)
    }

    /// Labels of the selected ids in display order. Unknown ids are skipped.
    pub fn labels(&self, selected: &[u32]) -> Vec<String> {
        self.choices
            .iter()
            .filter(|choice| selected.contains(&choice.id))
            .map(|choice| choice.label.to_string())
            .collect()
    }
}

const fn field(label: &'static str, key: &'static str) -> FieldDescriptor {
    FieldDescriptor { label, key }
}

const fn choice(id: u32, label: &'static str) -> Choice {
    Choice { id, label }
}

pub const PASSPORT_FIELDS: &[FieldDescriptor] = &[
    field("Название компании", "title"),
    field("ФИО", "full_name"),
    field("Город", "city"),
    field("Должность", "position"),
    field("Телефон", "phone_number"),
    field("E-mail", "email"),
];

/// Single-select: who the contact is.
pub const CONTACT_TYPE: ChoiceGroup = ChoiceGroup {
    title: "Тип контакта",
    name: "contact_type",
    choices: &[
        choice(1, "ПРОЕКТНЫЙ ИНСТИТУТ"),
        choice(2, "ПОТРЕБИТЕЛЬ"),
        choice(3, "КОНКУРЕНТ"),
        choice(4, "ДРУГОЕ"),
    ],
};

pub const PRODUCT_TYPES: ChoiceGroup = ChoiceGroup {
    title: "Интересующая Вас продукция?",
    name: "product_type",
    choices: &[
        choice(1, "краны шаровые"),
        choice(2, "затворы дисковые"),
        choice(3, "клапаны обратные"),
        choice(4, "сильфоны и компенсаторы"),
        choice(5, "задвижки"),
        choice(6, "криогенная арматура"),
        choice(7, "блочно-модульное оборудование"),
        choice(8, "самостабилизатор давления"),
        choice(9, "электроприводы"),
        choice(10, "регулирующая арматура"),
        choice(11, "предохранительная арматура"),
        choice(12, "ДРУГОЕ"),
    ],
};

pub const MANUFACTURERS: ChoiceGroup = ChoiceGroup {
    title: "Какие производители Вас заинтересовали?",
    name: "manufacturer",
    choices: &[
        choice(1, "Саратовский арматурный завод"),
        choice(2, "Курганспецарматура"),
        choice(3, "НПО Регулятор"),
        choice(4, "Техпромарма"),
        choice(5, "Арматом"),
        choice(6, "Тулаэлектропривод"),
        choice(7, "Пульсатор"),
        choice(8, "Техно-Сфера"),
        choice(9, "ДРУГОЕ"),
    ],
};

/// Multi-select groups in display order.
pub const CHECKBOX_GROUPS: [ChoiceGroup; 2] = [PRODUCT_TYPES, MANUFACTURERS];

impl Questionnaire {
    /// Build answers from the option ids picked in the form.
    ///
    /// An unknown `contact_type_id` leaves `contact_type` empty.
    pub fn from_selection(
        product_ids: &[u32],
        manufacturer_ids: &[u32],
        contact_type_id: u32,
    ) -> Self {
        Self {
            product_type: PRODUCT_TYPES.labels(product_ids),
            manufacturer: MANUFACTURERS.labels(manufacturer_ids),
            contact_type: CONTACT_TYPE
                .label(contact_type_id)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passport_keys_match_submission_fields() {
        let keys: Vec<_> = PASSPORT_FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(keys, ["title", "full_name", "city", "position", "phone_number", "email"]);

        let passport = serde_json::to_value(crate::types::Passport::default()).unwrap();
        for key in keys {
            assert!(passport.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn option_ids_are_unique_within_each_group() {
        for group in [CONTACT_TYPE, PRODUCT_TYPES, MANUFACTURERS] {
            let mut ids: Vec<_> = group.choices.iter().map(|c| c.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), group.choices.len(), "{}", group.name);
        }
    }

    #[test]
    fn checkbox_groups_are_in_display_order() {
        assert_eq!(CHECKBOX_GROUPS[0].name, "product_type");
        assert_eq!(CHECKBOX_GROUPS[1].name, "manufacturer");
        assert_eq!(PRODUCT_TYPES.choices.len(), 12);
        assert_eq!(MANUFACTURERS.choices.len(), 9);
    }

    #[test]
    fn selection_maps_ids_to_labels_in_display_order() {
        let q = Questionnaire::from_selection(&[5, 1, 99], &[3], 2);
        assert_eq!(q.product_type, ["краны шаровые", "задвижки"]);
        assert_eq!(q.manufacturer, ["НПО Регулятор"]);
        assert_eq!(q.contact_type, "ПОТРЕБИТЕЛЬ");
    }

    #[test]
    fn unknown_contact_type_is_empty() {
        let q = Questionnaire::from_selection(&[], &[], 0);
        assert!(q.product_type.is_empty());
        assert_eq!(q.contact_type, "");
    }
}
