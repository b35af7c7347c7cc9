//! Dutch → English role translation for imported municipal contacts.
//!
//! Source data labels people with Dutch function titles; the translated label
//! rides along on the contact as `role_en`. Unknown titles translate to
//! `None` rather than echoing the original.

/// Common municipal function titles and their English renderings.
const ROLE_TRANSLATIONS: &[(&str, &str)] = &[
  // Council and governance
  ("Raadslid", "Council Member"),
  ("Burgemeester", "Mayor"),
  ("Locoburgemeester", "Deputy Mayor"),
  ("Wethouder", "Alderman"),
  ("Griffier", "Secretary to the Council"),
  ("Raadsgriffier", "Council Secretary"),
  ("Plaatsvervangend griffier", "Deputy Council Secretary"),
  ("Fractievoorzitter", "Faction Leader"),
  ("Gemeentesecretaris", "Municipal Secretary"),
  // Management and administration
  ("Directeur", "Director"),
  ("Adjunct-directeur", "Deputy Director"),
  ("Teamleider", "Team Leader"),
  ("Manager", "Manager"),
  ("Coördinator", "Coordinator"),
  ("Beleidsadviseur", "Policy Advisor"),
  ("Beleidsmedewerker", "Policy Officer"),
  // Legal and compliance
  ("Juriste", "Legal Counsel"),
  ("Woo-contactpersoon", "WOO Contact Person"),
  ("Woo-coördinator", "WOO Coordinator"),
  ("Compliance officer", "Compliance Officer"),
  // Finance
  ("Financieel adviseur", "Financial Advisor"),
  ("Controller", "Controller"),
  // HR and organisation
  ("HR-adviseur", "HR Advisor"),
  ("Personeelsadviseur", "Personnel Advisor"),
  // Communication
  ("Communicatiemedewerker", "Communications Officer"),
  ("Persvoorlichter", "Press Officer"),
  ("Communicatieadviseur", "Communications Advisor"),
  // IT
  ("ICT-beheerder", "IT Administrator"),
  ("Systeembeheerder", "Systems Administrator"),
  ("Informatiemanager", "Information Manager"),
  // Social services
  ("Maatschappelijk werker", "Social Worker"),
  ("Casemanager", "Case Manager"),
  // Planning and development
  ("Projectmanager", "Project Manager"),
  ("Urbanist", "Urban Planner"),
  // Support staff
  ("Secretaresse", "Secretary"),
  ("Receptionist", "Receptionist"),
  ("Administratieve medewerker", "Administrative Officer"),
  ("Baliemedewerker", "Counter Staff"),
  // Departments used as titles in the source data
  ("Bestuursondersteuning", "Administration & Support"),
  ("Financiën", "Finance"),
  ("Personeelszaken", "Human Resources"),
  ("Duurzaamheid", "Sustainability"),
  ("Economie", "Economy"),
];

/// Translate a Dutch role title. Exact (case-insensitive) matches win;
/// otherwise a known title contained in a compound one is used. Returns
/// `None` for titles the table does not know.
pub fn translate_role(role: &str) -> Option<String> {
  let role = role.trim();
  if role.is_empty() {
    return None;
  }

  let lowered = role.to_lowercase();
  if let Some((_, english)) = ROLE_TRANSLATIONS
    .iter()
    .find(|(dutch, _)| dutch.to_lowercase() == lowered)
  {
    return Some((*english).to_owned());
  }

  // Compound titles like "Wethouder Financiën" still get the base rendering.
  ROLE_TRANSLATIONS
    .iter()
    .find(|(dutch, _)| lowered.contains(&dutch.to_lowercase()))
    .map(|(_, english)| (*english).to_owned())
}

#[cfg(test)]
mod tests {
  use super::translate_role;

  #[test]
  fn exact_match_is_case_insensitive() {
    assert_eq!(translate_role("burgemeester").as_deref(), Some("Mayor"));
    assert_eq!(translate_role("Burgemeester").as_deref(), Some("Mayor"));
  }

  #[test]
  fn compound_titles_use_the_base_title() {
    assert_eq!(
      translate_role("Wethouder Financiën en Sport").as_deref(),
      Some("Alderman")
    );
  }

  #[test]
  fn unknown_titles_do_not_translate() {
    assert_eq!(translate_role("Hoofd Sterrenkunde"), None);
    assert_eq!(translate_role("  "), None);
  }
}
