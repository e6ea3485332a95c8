// Scenario Generator
// Relatable everyday scenarios and calendar hooks, with per-category anti-repetition

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

use super::pick;
use crate::models::{Scenario, ScenarioCategory, TemporalHook};

pub struct ScenarioTemplate {
    pub setup: &'static str,
    pub characters: &'static [&'static str],
    pub setting: &'static str,
    pub conflict: Option<&'static str>,
    pub keywords: &'static [&'static str],
}

impl ScenarioTemplate {
    fn to_scenario(&self, category: ScenarioCategory) -> Scenario {
        Scenario {
            category,
            setup: self.setup.to_string(),
            characters: self.characters.iter().map(|c| c.to_string()).collect(),
            setting: self.setting.to_string(),
            conflict: self.conflict.map(str::to_string),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

const WORKPLACE: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "An employee discovers their performance review was shared with colleagues without consent",
        characters: &["employee", "manager", "HR representative"],
        setting: "Corporate office",
        conflict: Some("Privacy breach vs workplace transparency"),
        keywords: &["privacy", "dignity", "information", "employment"],
    },
    ScenarioTemplate {
        setup: "A worker is asked to work overtime without additional pay during a critical project",
        characters: &["worker", "supervisor", "team lead"],
        setting: "Small business",
        conflict: Some("Labor rights vs business demands"),
        keywords: &["labor", "fair", "conditions", "work"],
    },
    ScenarioTemplate {
        setup: "An employee is denied a promotion after revealing their political views on social media",
        characters: &["employee", "hiring committee", "colleague"],
        setting: "Marketing firm",
        conflict: Some("Free expression vs professional consequences"),
        keywords: &["expression", "speech", "freedom", "belief"],
    },
    ScenarioTemplate {
        setup: "A pregnant employee is subtly encouraged to take 'extended leave' indefinitely",
        characters: &["pregnant employee", "manager", "coworker"],
        setting: "Tech startup",
        conflict: Some("Equality vs implicit discrimination"),
        keywords: &["equality", "discrimination", "gender", "unfair"],
    },
];

const FAMILY: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "Grandparents are denied visitation rights after their child's divorce",
        characters: &["grandparents", "parent", "grandchild"],
        setting: "Family home",
        conflict: Some("Family bonds vs parental authority"),
        keywords: &["family", "children", "care", "rights"],
    },
    ScenarioTemplate {
        setup: "A teenager wants to make their own medical decisions against parents' wishes",
        characters: &["teenager", "parents", "doctor"],
        setting: "Hospital",
        conflict: Some("Minor autonomy vs parental responsibility"),
        keywords: &["children", "health", "decision", "consent"],
    },
    ScenarioTemplate {
        setup: "An elderly parent's children disagree about care arrangements",
        characters: &["elderly parent", "adult children", "caregiver"],
        setting: "Family meeting",
        conflict: Some("Dignity vs safety concerns"),
        keywords: &["dignity", "care", "elderly", "decision"],
    },
];

const COMMUNITY: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "Residents protest a new development that would demolish a historic neighborhood",
        characters: &["residents", "developer", "city council"],
        setting: "Community hall meeting",
        conflict: Some("Property development vs community heritage"),
        keywords: &["property", "community", "culture", "heritage"],
    },
    ScenarioTemplate {
        setup: "A neighborhood watch group starts monitoring 'suspicious' newcomers",
        characters: &["long-time resident", "new family", "watch coordinator"],
        setting: "Suburban neighborhood",
        conflict: Some("Security vs discrimination"),
        keywords: &["equality", "dignity", "freedom", "movement"],
    },
    ScenarioTemplate {
        setup: "Local religious groups clash over the use of shared community space",
        characters: &["religious leaders", "community members", "space manager"],
        setting: "Community center",
        conflict: Some("Religious freedom vs equal access"),
        keywords: &["religion", "belief", "equality", "freedom"],
    },
];

const COMMERCE: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A shop owner refuses service based on the customer's appearance",
        characters: &["customer", "shop owner", "other patrons"],
        setting: "Retail store",
        conflict: Some("Business rights vs discrimination"),
        keywords: &["equality", "dignity", "discrimination", "public"],
    },
    ScenarioTemplate {
        setup: "A company's terms of service allow them to use customer data for AI training",
        characters: &["consumer", "company", "data analyst"],
        setting: "Online platform",
        conflict: Some("Business innovation vs privacy"),
        keywords: &["privacy", "information", "consent", "data"],
    },
    ScenarioTemplate {
        setup: "A landlord increases rent by 50% in an area with limited housing options",
        characters: &["tenant", "landlord", "housing advocate"],
        setting: "Apartment complex",
        conflict: Some("Property rights vs housing access"),
        keywords: &["housing", "property", "access", "shelter"],
    },
];

const GOVERNMENT: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A permit application is delayed indefinitely without explanation",
        characters: &["applicant", "government official", "supervisor"],
        setting: "Municipal office",
        conflict: Some("Administrative discretion vs accountability"),
        keywords: &["administrative", "justice", "fair", "procedure"],
    },
    ScenarioTemplate {
        setup: "Police conduct a search without a warrant citing 'reasonable suspicion'",
        characters: &["citizen", "police officers", "lawyer"],
        setting: "Public street",
        conflict: Some("Security measures vs privacy rights"),
        keywords: &["privacy", "security", "search", "liberty"],
    },
    ScenarioTemplate {
        setup: "A journalist is denied access to public records about government spending",
        characters: &["journalist", "government spokesperson", "editor"],
        setting: "Government building",
        conflict: Some("Transparency vs state interests"),
        keywords: &["information", "access", "press", "freedom"],
    },
];

const DIGITAL: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A social media platform permanently bans a user for 'misinformation'",
        characters: &["user", "platform moderator", "appeal reviewer"],
        setting: "Online platform",
        conflict: Some("Platform rules vs speech rights"),
        keywords: &["expression", "speech", "freedom", "media"],
    },
    ScenarioTemplate {
        setup: "An employer monitors all employee communications including personal messages",
        characters: &["employee", "IT admin", "HR"],
        setting: "Remote work",
        conflict: Some("Workplace oversight vs privacy"),
        keywords: &["privacy", "communication", "surveillance", "work"],
    },
    ScenarioTemplate {
        setup: "A government proposes ID verification for all social media accounts",
        characters: &["citizen", "lawmaker", "privacy advocate"],
        setting: "Public debate",
        conflict: Some("Accountability vs anonymity"),
        keywords: &["privacy", "identity", "freedom", "expression"],
    },
];

const HEALTHCARE: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A patient is denied treatment because they can't prove insurance coverage",
        characters: &["patient", "hospital administrator", "doctor"],
        setting: "Emergency room",
        conflict: Some("Healthcare access vs financial policies"),
        keywords: &["health", "access", "care", "life"],
    },
    ScenarioTemplate {
        setup: "Medical records are shared with a patient's employer without explicit consent",
        characters: &["patient", "doctor", "employer"],
        setting: "Medical office",
        conflict: Some("Medical transparency vs privacy"),
        keywords: &["privacy", "health", "information", "confidential"],
    },
    ScenarioTemplate {
        setup: "A patient seeks an experimental treatment that doctors advise against",
        characters: &["patient", "doctor", "family member"],
        setting: "Hospital consultation room",
        conflict: Some("Patient autonomy vs medical judgment"),
        keywords: &["health", "choice", "life", "decision"],
    },
];

const EDUCATION: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A student is disciplined for wearing cultural clothing to school",
        characters: &["student", "principal", "parent"],
        setting: "Public school",
        conflict: Some("Dress code vs cultural expression"),
        keywords: &["culture", "expression", "education", "religion"],
    },
    ScenarioTemplate {
        setup: "A university requires students to use specific pronouns in class discussions",
        characters: &["student", "professor", "classmate"],
        setting: "University classroom",
        conflict: Some("Inclusion policies vs personal beliefs"),
        keywords: &["expression", "dignity", "belief", "equality"],
    },
    ScenarioTemplate {
        setup: "School assigns children to classes based on standardized test scores",
        characters: &["student", "teacher", "parent"],
        setting: "Elementary school",
        conflict: Some("Educational efficiency vs equal opportunity"),
        keywords: &["education", "equality", "children", "opportunity"],
    },
];

const HOUSING: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A family faces eviction during winter despite paying partial rent",
        characters: &["tenant family", "landlord", "social worker"],
        setting: "Rental apartment",
        conflict: Some("Property rights vs shelter needs"),
        keywords: &["housing", "shelter", "property", "children"],
    },
    ScenarioTemplate {
        setup: "Rental applications are rejected based on applicants' country of origin",
        characters: &["applicants", "property manager", "real estate agent"],
        setting: "Housing market",
        conflict: Some("Landlord choice vs discrimination"),
        keywords: &["equality", "discrimination", "housing", "nationality"],
    },
    ScenarioTemplate {
        setup: "A homeowner is forced to sell for a highway project at below-market value",
        characters: &["homeowner", "government official", "real estate appraiser"],
        setting: "Family home",
        conflict: Some("Public infrastructure vs property rights"),
        keywords: &["property", "compensation", "government", "fair"],
    },
];

const TRANSPORT: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        setup: "A person with a disability is denied boarding due to 'safety concerns'",
        characters: &["passenger", "transport staff", "supervisor"],
        setting: "Public transit",
        conflict: Some("Safety policies vs equal access"),
        keywords: &["equality", "dignity", "access", "disability"],
    },
    ScenarioTemplate {
        setup: "Ride-sharing app surcharges certain neighborhoods based on 'risk factors'",
        characters: &["rider", "driver", "app company"],
        setting: "Urban area",
        conflict: Some("Business pricing vs discrimination"),
        keywords: &["equality", "movement", "discrimination", "service"],
    },
    ScenarioTemplate {
        setup: "A commuter is held at a roadblock for refusing to say where they are travelling",
        characters: &["commuter", "traffic officer", "passenger"],
        setting: "Highway checkpoint",
        conflict: Some("Law enforcement vs freedom of movement"),
        keywords: &["movement", "freedom", "privacy", "police"],
    },
];

pub fn templates_for(category: ScenarioCategory) -> &'static [ScenarioTemplate] {
    match category {
        ScenarioCategory::Workplace => WORKPLACE,
        ScenarioCategory::Family => FAMILY,
        ScenarioCategory::Community => COMMUNITY,
        ScenarioCategory::Commerce => COMMERCE,
        ScenarioCategory::Government => GOVERNMENT,
        ScenarioCategory::Digital => DIGITAL,
        ScenarioCategory::Healthcare => HEALTHCARE,
        ScenarioCategory::Education => EDUCATION,
        ScenarioCategory::Housing => HOUSING,
        ScenarioCategory::Transport => TRANSPORT,
    }
}

use ScenarioCategory as C;

pub const KEYWORD_CATEGORIES: &[(&str, &[ScenarioCategory])] = &[
    ("work", &[C::Workplace]),
    ("employment", &[C::Workplace]),
    ("job", &[C::Workplace]),
    ("labor", &[C::Workplace]),
    ("family", &[C::Family]),
    ("children", &[C::Family, C::Education]),
    ("parent", &[C::Family]),
    ("marriage", &[C::Family]),
    ("community", &[C::Community]),
    ("neighborhood", &[C::Community]),
    ("local", &[C::Community]),
    ("business", &[C::Commerce]),
    ("consumer", &[C::Commerce]),
    ("shop", &[C::Commerce]),
    ("buy", &[C::Commerce]),
    ("sell", &[C::Commerce]),
    ("government", &[C::Government]),
    ("state", &[C::Government]),
    ("official", &[C::Government]),
    ("police", &[C::Government]),
    ("online", &[C::Digital]),
    ("internet", &[C::Digital]),
    ("digital", &[C::Digital]),
    ("data", &[C::Digital]),
    ("social media", &[C::Digital]),
    ("health", &[C::Healthcare]),
    ("medical", &[C::Healthcare]),
    ("hospital", &[C::Healthcare]),
    ("doctor", &[C::Healthcare]),
    ("school", &[C::Education]),
    ("education", &[C::Education]),
    ("student", &[C::Education]),
    ("university", &[C::Education]),
    ("housing", &[C::Housing]),
    ("home", &[C::Housing]),
    ("rent", &[C::Housing]),
    ("property", &[C::Housing, C::Commerce]),
    ("transport", &[C::Transport]),
    ("travel", &[C::Transport]),
    ("movement", &[C::Transport]),
];

struct Occasion {
    occasion: &'static str,
    relevance: &'static str,
    angle: &'static str,
}

const fn occasion(occasion: &'static str, relevance: &'static str, angle: &'static str) -> Occasion {
    Occasion { occasion, relevance, angle }
}

/// Indexed by month - 1.
const TEMPORAL_OCCASIONS: [&[Occasion]; 12] = [
    &[occasion("New Year", "Fresh start, new resolutions for civic engagement", "What constitutional principles should guide our year?")],
    &[occasion("Valentine's Day period", "Love, relationships, family rights", "How does the constitution protect our loved ones?")],
    &[
        occasion("Human Rights Month", "Rights awareness", "Reflecting on rights we take for granted"),
        occasion("Freedom Day (21st)", "Democratic milestone", "How far we've come, how far to go"),
    ],
    &[occasion("Freedom Month", "April 27 elections anniversary", "The vote that changed everything")],
    &[
        occasion("Workers' Month", "Labor rights", "Constitutional protections at work"),
        occasion("Africa Month", "Continental identity", "African constitutionalism and SA's role"),
    ],
    &[occasion("Youth Month", "Youth Day (16th)", "Young people and constitutional awareness")],
    &[occasion("Mandela Month", "Legacy of constitutional democracy", "The constitutional vision Mandela helped build")],
    &[occasion("Women's Month", "Gender equality", "Constitutional protections for women")],
    &[occasion("Heritage Month", "Cultural rights", "Protecting diverse traditions under one constitution")],
    &[occasion("Transport Month", "Freedom of movement", "The right to move freely")],
    &[occasion("Remembrance period", "Honoring those who fought for rights", "Constitutional rights earned through struggle")],
    &[
        occasion("Reconciliation Day (16th)", "National unity", "The constitution as a reconciliation document"),
        occasion("Constitution Day (10th)", "Direct constitutional celebration", "Celebrating the supreme law of the land"),
    ],
];

/// Best category for the keywords by table hits. On a tie the category that
/// was scored first wins. `None` when nothing matches.
pub fn score_categories(keywords: &[String]) -> Option<ScenarioCategory> {
    let mut scores: Vec<(ScenarioCategory, usize)> = Vec::new();

    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        for (kw, categories) in KEYWORD_CATEGORIES {
            if !(kw.contains(keyword.as_str()) || keyword.contains(kw)) {
                continue;
            }
            for category in *categories {
                match scores.iter_mut().find(|(c, _)| c == category) {
                    Some((_, score)) => *score += 1,
                    None => scores.push((*category, 1)),
                }
            }
        }
    }

    let best = scores.iter().map(|(_, s)| *s).max()?;
    scores.into_iter().find(|(_, s)| *s == best).map(|(c, _)| c)
}

/// Table keywords that appear anywhere in the topic text.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    let topic = topic.to_lowercase();
    KEYWORD_CATEGORIES
        .iter()
        .filter(|(kw, _)| topic.contains(kw))
        .map(|(kw, _)| kw.to_string())
        .collect()
}

/// Per-instance generator. Not meant to be shared between concurrent requests.
pub struct ScenarioGenerator {
    rng: StdRng,
    used: HashMap<ScenarioCategory, HashSet<&'static str>>,
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioGenerator {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            used: HashMap::new(),
        }
    }

    pub fn all_categories(&self) -> Vec<ScenarioCategory> {
        ScenarioCategory::ALL.to_vec()
    }

    pub fn random_category(&mut self) -> ScenarioCategory {
        ScenarioCategory::ALL[self.rng.random_range(0..ScenarioCategory::ALL.len())]
    }

    /// Forget every template handed out so far.
    pub fn clear(&mut self) {
        self.used.clear();
    }

    fn match_category(&mut self, keywords: &[String]) -> ScenarioCategory {
        match score_categories(keywords) {
            Some(category) => category,
            None => self.random_category(),
        }
    }

    pub fn generate_scenario(
        &mut self,
        category: Option<ScenarioCategory>,
        keywords: &[String],
        avoid_recent: bool,
    ) -> Scenario {
        let category = match category {
            Some(c) => c,
            None => self.match_category(keywords),
        };

        let templates = templates_for(category);
        let template = if avoid_recent {
            let used = self.used.entry(category).or_default();
            if templates.iter().all(|t| used.contains(t.setup)) {
                used.clear();
            }
            let available: Vec<&ScenarioTemplate> =
                templates.iter().filter(|t| !used.contains(t.setup)).collect();
            let choice = available[self.rng.random_range(0..available.len())];
            used.insert(choice.setup);
            choice
        } else {
            &templates[self.rng.random_range(0..templates.len())]
        };

        tracing::debug!(category = category.as_str(), setting = template.setting, "scenario.generated");
        template.to_scenario(category)
    }

    pub fn match_scenario_to_topic(&mut self, topic: &str, section_keywords: &[String]) -> Scenario {
        let mut keywords: Vec<String> = section_keywords.to_vec();
        for kw in topic_keywords(topic) {
            if !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
        self.generate_scenario(None, &keywords, true)
    }

    /// Scenario for an insight, re-rolled among the other categories when the
    /// matched one must be avoided.
    pub fn get_scenario_for_insight(
        &mut self,
        insight_keywords: &[String],
        avoid_category: Option<ScenarioCategory>,
    ) -> Scenario {
        let mut category = self.match_category(insight_keywords);

        if avoid_category == Some(category) {
            let others: Vec<ScenarioCategory> =
                ScenarioCategory::ALL.into_iter().filter(|c| *c != category).collect();
            category = others[self.rng.random_range(0..others.len())];
        }

        self.generate_scenario(Some(category), insight_keywords, true)
    }

    /// `n` scenarios, each from a category not yet used in this call until
    /// every category has appeared once.
    pub fn get_scenarios_for_thread(&mut self, n: usize, topic_keywords: &[String]) -> Vec<Scenario> {
        let mut scenarios = Vec::with_capacity(n);
        let mut used_categories: HashSet<ScenarioCategory> = HashSet::new();

        for _ in 0..n {
            let mut available: Vec<ScenarioCategory> = ScenarioCategory::ALL
                .into_iter()
                .filter(|c| !used_categories.contains(c))
                .collect();
            if available.is_empty() {
                used_categories.clear();
                available = ScenarioCategory::ALL.to_vec();
            }

            let category = available[self.rng.random_range(0..available.len())];
            used_categories.insert(category);
            scenarios.push(self.generate_scenario(Some(category), topic_keywords, true));
        }

        scenarios
    }

    /// Calendar occasion for the date's month; today when no date is given.
    pub fn get_temporal_hook(&mut self, date: Option<NaiveDate>) -> Option<TemporalHook> {
        let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
        let occasions = TEMPORAL_OCCASIONS.get(date.month0() as usize)?;
        let chosen = pick(&mut self.rng, occasions)?;

        Some(TemporalHook {
            date,
            occasion: chosen.occasion.to_string(),
            relevance: chosen.relevance.to_string(),
            suggested_angle: chosen.angle.to_string(),
        })
    }
}
