use protocol::{GuidelineCategory, GuidelinePoint};

pub(crate) const APP_NAME: &str = "CyberGuard Analytics";
pub(crate) const EVENT_TITLE: &str = "Smart India Hackathon 2025";

pub(crate) const PROBLEM_STATEMENT: &str = "\
Problem Statement Title: Development of a Predictive Analytics Framework for Cybercrime Complaints to Forecast Likely Cash Withdrawal Locations in Advance, Enabling Generation of Actionable Intelligence for Timely and Proactive Cybercrime Intervention.

Background: The National Cybercrime Reporting Portal is the centralized Portal, which is serving the whole country. Currently, the Portal facilitates citizens in filing complaints, LEAs act on complaints, Banking/Financial Institutions for their actions along with reports/graphs being pulled on daily basis. Presently, the Portal is receiving approximately 8000 complaints on daily basis. The number of complaints has increased manifold during the past months, and this will continue to rise in future. To address the issue of increasing cybercrimes, the proactive approach shall be adopted.

Description: This framework focuses on the mitigation of cybercrimes by the adopting a proactive approach. This framework's output will enable the prediction of likely cash withdrawal locations, which, in turn, will allow Law Enforcement Agencies (LEAs) at the state and local levels, coordinated by I4C, to implement proactive interventions. These interventions could include deploying special teams or alerting local banks and ATMs in high-risk areas. The intelligence generated would also help banks and Financial Institutions (FIs) through the Citizen Financial Cyber Fraud Reporting and Management System, enabling faster, fund blocking and increasing the chances of recovery.

Key Deliverables:
a. Predictive Analytics Engine: AI/ML - based system to analyse historical cybercrime and financial data to predict potential withdrawal hotspots.
b. Risk Heatmap Dashboard: GIS-enabled dashboard visualizing real-time and potential risk zones.
c. Law Enforcement Interface: Secure interface for investigators to access alerts, intelligence reports, and evidence documentation.
d. Alert & Notification System: Real-time notifications to law enforcements, banks and I4C officers.";

pub(crate) struct ProblemSummary {
    pub(crate) title: &'static str,
    pub(crate) tags: [&'static str; 2],
    pub(crate) background: &'static str,
    pub(crate) goal: &'static str,
}

pub(crate) const PROBLEM_SUMMARY: ProblemSummary = ProblemSummary {
    title: "Predictive Analytics Framework for Cybercrime Intervention",
    tags: ["National Cybercrime Reporting Portal", "Proactive Mitigation"],
    background: "The National Cybercrime Reporting Portal is central to India's defense, receiving ~8000 complaints daily. With numbers rising, a purely reactive approach is insufficient. Law Enforcement Agencies (LEAs) and Banks need actionable intelligence to act before crimes occur.",
    goal: "Develop a framework to forecast likely cash withdrawal locations. This enables LEAs to deploy teams proactively and alert banks/ATMs in high-risk zones, significantly increasing fund recovery chances and blocking fraudulent flows.",
};

pub(crate) const DELIVERABLES: [(&str, &str); 4] = [
    (
        "Predictive Analytics Engine",
        "AI/ML system analyzing historical data to predict withdrawal hotspots with geospatial risk modeling.",
    ),
    (
        "Risk Heatmap Dashboard",
        "GIS-enabled dashboard visualizing real-time risk zones with drill-down filters (time, location, crime category).",
    ),
    (
        "LEA Interface",
        "Secure portal for investigators to access intelligence reports and evidence documentation.",
    ),
    (
        "Alert System",
        "Real-time notifications via SMS/Email/API to law enforcement, banks, and I4C officers.",
    ),
];

const fn guideline(
    id: u32,
    title: &'static str,
    description: &'static str,
    category: GuidelineCategory,
) -> GuidelinePoint {
    GuidelinePoint {
        id,
        title,
        description,
        category,
    }
}

use GuidelineCategory::{Coordination, Finance, General, Technical};

pub(crate) static GUIDELINES: [GuidelinePoint; 15] = [
    guideline(1, "Prototype Maturity", "Hackathon prototypes are usually crude. Considerable work is required to make them reliable, field-ready solutions.", Technical),
    guideline(2, "Development Duration", "Ideally 6 months to 1 year. Can be adjusted with mutual consent.", General),
    guideline(3, "Initiation", "Ministries should directly contact winning teams to discuss the roadmap once contact details are shared by MoE/AICTE.", Coordination),
    guideline(4, "Project Plan", "Ministries should request a detailed plan including implementation details, tools (software/hardware), expert support, and timelines.", Coordination),
    guideline(5, "Procurement", "Ministry should procure critical commercial software/hardware for the project.", Finance),
    guideline(6, "Oversight Agency", "Ministry should identify an autonomous/technical agency for overall coordination. Alternatively, a panel of experts may be appointed.", Coordination),
    guideline(7, "Mentorship", "Minimum one experienced technical expert per idea should be assigned as a 'mentor'.", Technical),
    guideline(8, "Monitoring", "Regular weekly/monthly video conference monitoring sessions are highly recommended as teams work remotely.", Coordination),
    guideline(9, "Faculty Mentor", "A faculty member from the team's institution may be co-opted as an additional mentor.", Coordination),
    guideline(10, "Institutional Consent", "Written consent from the educational institution is required for support/time. No financial burden on the institution.", General),
    guideline(11, "Travel Expenses", "Ministry bears expenses for travel, stay, and logistics when teams visit deployment sites.", Finance),
    guideline(12, "Cybersecurity", "For software solutions, a cybersecurity expert may be engaged to ensure safety standards.", Technical),
    guideline(13, "Hardware Design", "For hardware products, a 'Product Design Expert' may be consulted.", Technical),
    guideline(14, "Stipend", "Recommended stipend of Rs 5,000/- per month per student for 6 months (min). Max 6 students per team. Adjusted if team is larger.", Finance),
    guideline(15, "Reporting", "Quarterly status reports to be shared with Ministry of Education's Innovation Cell and AICTE.", Coordination),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum GuidelineFilter {
    #[default]
    All,
    Only(GuidelineCategory),
}

impl GuidelineFilter {
    pub(crate) const TABS: [GuidelineFilter; 5] = [
        GuidelineFilter::All,
        GuidelineFilter::Only(General),
        GuidelineFilter::Only(Technical),
        GuidelineFilter::Only(Finance),
        GuidelineFilter::Only(Coordination),
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            GuidelineFilter::All => "All",
            GuidelineFilter::Only(category) => category.as_str(),
        }
    }

    pub(crate) fn matches(self, point: &GuidelinePoint) -> bool {
        match self {
            GuidelineFilter::All => true,
            GuidelineFilter::Only(category) => point.category == category,
        }
    }
}

pub(crate) fn guidelines_in(filter: GuidelineFilter) -> Vec<&'static GuidelinePoint> {
    GUIDELINES.iter().filter(|point| filter.matches(point)).collect()
}

pub(crate) fn full_context() -> String {
    let guidelines = GUIDELINES
        .iter()
        .map(|g| format!("{}. {}: {}", g.id, g.title, g.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{PROBLEM_STATEMENT}\n\nSIH 2025 Implementation Guidelines:\n{guidelines}\n")
}

pub(crate) fn assistant_instruction() -> String {
    format!(
        "You are an expert consultant for the Smart India Hackathon (SIH) 2025.\n\
Your knowledge is strictly based on the provided document text.\n\n\
Document Context:\n{}\n\
Role:\n\
- Answer questions about the implementation guidelines, stipend, mentorship, and the specific Problem Statement regarding Cybercrime Predictive Analytics.\n\
- Be professional, concise, and helpful.\n\
- If the answer is not in the context, state that it is not covered in the provided guidelines.\n",
        full_context()
    )
}

pub(crate) const ASSISTANT_GREETING: &str = "Hello! I am your SIH 2025 Consultant. Ask me about the Cybercrime Predictive Analytics project guidelines, stipends, or implementation details.";

pub(crate) struct StatCard {
    pub(crate) label: &'static str,
    pub(crate) value: &'static str,
}

pub(crate) const STAT_CARDS: [StatCard; 4] = [
    StatCard { label: "Daily Complaints", value: "~8,000" },
    StatCard { label: "Real-time Withdrawals", value: "1,245" },
    StatCard { label: "Active Hotspots", value: "14" },
    StatCard { label: "Intervention Rate", value: "82%" },
];

// (time label, complaints, risk score)
pub(crate) const COMPLAINT_TIMELINE: [(&str, u64, u64); 7] = [
    ("00:00", 120, 80),
    ("04:00", 50, 40),
    ("08:00", 180, 60),
    ("12:00", 450, 55),
    ("16:00", 380, 70),
    ("20:00", 600, 90),
    ("23:59", 300, 85),
];

// (zone, volume, risk score)
pub(crate) const REGIONAL_RISK: [(&str, u64, u64); 5] = [
    ("North Zone", 400, 75),
    ("East Zone", 300, 45),
    ("South Zone", 550, 60),
    ("West Zone", 700, 88),
    ("Central", 200, 30),
];

pub(crate) const LIVE_ALERT: &str = "The predictive engine is currently monitoring 14,203 data points across the banking network. Real-time synchronization with I4C is active.";
