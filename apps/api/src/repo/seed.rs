//! Demo fixtures loaded at startup when `SEED_FIXTURES` is on.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::chat::{Channel, ChatMessage, ChatRoom, MessageStatus, RoomStatus};
use crate::models::client::{Client, ClientStatus};
use crate::models::contract::{Contract, ContractStatus, ContractType};
use crate::models::employee::{Employee, EmployeeStatus};
use crate::models::invoice::{Invoice, InvoiceStatus};
use crate::models::vendor::{Vendor, VendorStatus};

pub struct Fixtures {
    pub candidates: Vec<Candidate>,
    pub clients: Vec<Client>,
    pub vendors: Vec<Vendor>,
    pub employees: Vec<Employee>,
    pub chat_rooms: Vec<ChatRoom>,
    pub messages: Vec<ChatMessage>,
    pub contracts: Vec<Contract>,
    pub invoices: Vec<Invoice>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub fn fixtures() -> Fixtures {
    Fixtures {
        candidates: candidates(),
        clients: clients(),
        vendors: vendors(),
        employees: employees(),
        chat_rooms: chat_rooms(),
        messages: messages(),
        contracts: contracts(),
        invoices: invoices(),
    }
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    id: &str,
    name: &str,
    email: &str,
    role: &str,
    location: &str,
    tags: &[&str],
    source: &str,
    status: CandidateStatus,
    experience_years: u32,
    rating: f64,
    applied_on: NaiveDate,
) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        role: role.to_string(),
        location: Some(location.to_string()),
        tags: strings(tags),
        source: Some(source.to_string()),
        status,
        experience_years,
        rating: Some(rating),
        applied_on,
    }
}

fn candidates() -> Vec<Candidate> {
    let mut list = vec![
        candidate(
            "cand-001",
            "Dana Cohen",
            "dana.cohen@example.com",
            "Senior Backend Engineer",
            "Tel Aviv",
            &["rust", "postgres", "kubernetes"],
            "referral",
            CandidateStatus::Interview,
            7,
            4.6,
            date(2024, 9, 2),
        ),
        candidate(
            "cand-002",
            "Avi Mizrahi",
            "avi.mizrahi@example.com",
            "Product Designer",
            "Haifa",
            &["figma", "ux"],
            "linkedin",
            CandidateStatus::Applied,
            3,
            3.9,
            date(2024, 9, 18),
        ),
        candidate(
            "cand-003",
            "Noa Shapiro",
            "noa.shapiro@example.com",
            "Data Scientist",
            "Tel Aviv",
            &["python", "ml"],
            "job_board",
            CandidateStatus::Offer,
            5,
            4.8,
            date(2024, 8, 11),
        ),
        candidate(
            "cand-004",
            "Yossi Levi",
            "yossi.levi@example.com",
            "DevOps Engineer",
            "Jerusalem",
            &["aws", "terraform"],
            "referral",
            CandidateStatus::PhoneScreen,
            6,
            4.2,
            date(2024, 9, 25),
        ),
        candidate(
            "cand-005",
            "Tamar Katz",
            "tamar.katz@example.com",
            "QA Lead",
            "Remote",
            &["automation", "cypress"],
            "linkedin",
            CandidateStatus::Hired,
            9,
            4.5,
            date(2024, 6, 3),
        ),
        candidate(
            "cand-006",
            "Eitan Ben-David",
            "eitan.bd@example.com",
            "Frontend Developer",
            "Tel Aviv",
            &["react", "typescript"],
            "job_board",
            CandidateStatus::Rejected,
            2,
            3.1,
            date(2024, 7, 21),
        ),
    ];
    list[0].phone = Some("+972501112233".to_string());
    list[2].phone = Some("+972524445566".to_string());
    list
}

fn clients() -> Vec<Client> {
    let client = |id: &str,
                  company: &str,
                  contact: &str,
                  email: &str,
                  industry: &str,
                  status: ClientStatus,
                  open_positions: u32,
                  debt: f64,
                  satisfaction: Option<f64>| Client {
        id: id.to_string(),
        company: company.to_string(),
        contact_name: contact.to_string(),
        email: email.to_string(),
        phone: None,
        industry: industry.to_string(),
        account_manager: Some("Rivka Adler".to_string()),
        status,
        open_positions,
        outstanding_debt: debt,
        satisfaction,
    };
    vec![
        client(
            "client-001",
            "Nimbus Payments",
            "Gil Harel",
            "gil@nimbuspay.example",
            "fintech",
            ClientStatus::Active,
            4,
            12_500.0,
            Some(4.5),
        ),
        client(
            "client-002",
            "Helix Health",
            "Orly Bar",
            "orly@helixhealth.example",
            "healthtech",
            ClientStatus::Active,
            2,
            0.0,
            Some(4.1),
        ),
        client(
            "client-003",
            "Orbit Logistics",
            "Ran Segal",
            "ran@orbitlog.example",
            "logistics",
            ClientStatus::OnHold,
            1,
            8_300.5,
            Some(3.2),
        ),
        client(
            "client-004",
            "Quanta Labs",
            "Michal Dror",
            "michal@quanta.example",
            "deeptech",
            ClientStatus::Prospect,
            0,
            0.0,
            None,
        ),
    ]
}

fn vendors() -> Vec<Vendor> {
    let vendor = |id: &str,
                  name: &str,
                  contact: &str,
                  category: &str,
                  services: &[&str],
                  status: VendorStatus,
                  rating: Option<f64>,
                  contract_value: f64,
                  used: u32,
                  total: u32| Vendor {
        id: id.to_string(),
        name: name.to_string(),
        contact_name: contact.to_string(),
        email: format!("{}@vendors.example", contact.to_lowercase().replace(' ', ".")),
        category: category.to_string(),
        services: strings(services),
        status,
        rating,
        contract_value,
        used_capacity: used,
        total_capacity: total,
    };
    vec![
        vendor(
            "vendor-001",
            "TalentBoard",
            "Hila Stern",
            "job_board",
            &["job postings", "sourcing"],
            VendorStatus::Active,
            Some(4.8),
            24_000.0,
            35,
            50,
        ),
        vendor(
            "vendor-002",
            "VerifyNow",
            "Amit Rosen",
            "background_check",
            &["background checks", "reference checks"],
            VendorStatus::Active,
            Some(4.3),
            9_000.0,
            120,
            200,
        ),
        vendor(
            "vendor-003",
            "StaffBridge",
            "Nir Golan",
            "staffing_partner",
            &["contractors", "payroll"],
            VendorStatus::Suspended,
            Some(3.6),
            45_000.0,
            8,
            20,
        ),
        vendor(
            "vendor-004",
            "SkillProof",
            "Keren Avraham",
            "assessment",
            &["coding tests"],
            VendorStatus::Pending,
            None,
            6_000.0,
            0,
            100,
        ),
    ]
}

fn employees() -> Vec<Employee> {
    let employee = |id: &str,
                    name: &str,
                    department: &str,
                    position: &str,
                    client: &str,
                    status: EmployeeStatus,
                    satisfaction: Option<f64>,
                    tenure_months: u32,
                    last_check_in: Option<NaiveDate>,
                    started_on: NaiveDate| Employee {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@placed.example", name.to_lowercase().replace(' ', ".")),
        department: department.to_string(),
        position: position.to_string(),
        client: Some(client.to_string()),
        status,
        satisfaction,
        tenure_months,
        last_check_in,
        started_on,
    };
    vec![
        employee(
            "emp-001",
            "Lior Peretz",
            "Engineering",
            "Backend Developer",
            "Nimbus Payments",
            EmployeeStatus::Active,
            Some(8.5),
            14,
            Some(date(2024, 9, 20)),
            date(2023, 7, 1),
        ),
        employee(
            "emp-002",
            "Shira Gold",
            "Engineering",
            "QA Engineer",
            "Helix Health",
            EmployeeStatus::AtRisk,
            Some(4.0),
            5,
            Some(date(2024, 6, 10)),
            date(2024, 4, 15),
        ),
        employee(
            "emp-003",
            "Moshe Azulay",
            "Operations",
            "Logistics Coordinator",
            "Orbit Logistics",
            EmployeeStatus::Active,
            Some(6.5),
            26,
            None,
            date(2022, 7, 1),
        ),
        employee(
            "emp-004",
            "Yael Friedman",
            "Design",
            "UX Designer",
            "Nimbus Payments",
            EmployeeStatus::Onboarding,
            None,
            1,
            None,
            date(2024, 9, 1),
        ),
        employee(
            "emp-005",
            "Daniel Oren",
            "Data",
            "Data Analyst",
            "Helix Health",
            EmployeeStatus::Resigned,
            Some(3.0),
            11,
            Some(date(2024, 5, 2)),
            date(2023, 6, 1),
        ),
    ]
}

fn chat_rooms() -> Vec<ChatRoom> {
    vec![
        ChatRoom {
            id: "room-001".to_string(),
            name: "Dana Cohen".to_string(),
            participants: strings(&["Dana Cohen", "Rivka Adler"]),
            channel: Channel::Whatsapp,
            contact_address: Some("+972501112233".to_string()),
            unread: 2,
            last_message_preview: Some("Sounds good, see you Thursday".to_string()),
            last_message_at: Some(at(2024, 9, 30, 16, 5)),
            status: RoomStatus::Open,
        },
        ChatRoom {
            id: "room-002".to_string(),
            name: "Nimbus Payments hiring".to_string(),
            participants: strings(&["Gil Harel", "Rivka Adler"]),
            channel: Channel::Email,
            contact_address: Some("gil@nimbuspay.example".to_string()),
            unread: 0,
            last_message_preview: Some("Attached the updated role brief".to_string()),
            last_message_at: Some(at(2024, 9, 29, 9, 40)),
            status: RoomStatus::Open,
        },
        ChatRoom {
            id: "room-003".to_string(),
            name: "Recruiters".to_string(),
            participants: strings(&["Rivka Adler", "Ben Tal", "Sara Klein"]),
            channel: Channel::Internal,
            contact_address: None,
            unread: 5,
            last_message_preview: Some("Weekly pipeline review moved to 11:00".to_string()),
            last_message_at: Some(at(2024, 9, 30, 8, 15)),
            status: RoomStatus::Open,
        },
    ]
}

fn messages() -> Vec<ChatMessage> {
    let message = |id: &str, room_id: &str, sender: &str, body: &str, sent_at| ChatMessage {
        id: id.to_string(),
        room_id: room_id.to_string(),
        sender: sender.to_string(),
        body: body.to_string(),
        sent_at,
        status: MessageStatus::Delivered,
        failure_reason: None,
        provider_message_id: None,
    };
    vec![
        message(
            "msg-001",
            "room-001",
            "Rivka Adler",
            "Hi Dana, can we do the technical interview on Thursday at 14:00?",
            at(2024, 9, 30, 15, 50),
        ),
        message(
            "msg-002",
            "room-001",
            "Dana Cohen",
            "Sounds good, see you Thursday",
            at(2024, 9, 30, 16, 5),
        ),
        message(
            "msg-003",
            "room-002",
            "Gil Harel",
            "Attached the updated role brief",
            at(2024, 9, 29, 9, 40),
        ),
        message(
            "msg-004",
            "room-003",
            "Ben Tal",
            "Weekly pipeline review moved to 11:00",
            at(2024, 9, 30, 8, 15),
        ),
    ]
}

fn contracts() -> Vec<Contract> {
    vec![
        Contract {
            id: "contract-001".to_string(),
            candidate_id: "cand-005".to_string(),
            client_id: "client-002".to_string(),
            title: "QA Lead".to_string(),
            contract_type: ContractType::Permanent,
            start_date: date(2024, 7, 1),
            end_date: None,
            compensation: 98_000.0,
            currency: "USD".to_string(),
            status: ContractStatus::Signed,
            created_at: at(2024, 6, 20, 10, 0),
        },
        Contract {
            id: "contract-002".to_string(),
            candidate_id: "cand-003".to_string(),
            client_id: "client-001".to_string(),
            title: "Data Scientist".to_string(),
            contract_type: ContractType::FixedTerm,
            start_date: date(2024, 11, 1),
            end_date: Some(date(2025, 10, 31)),
            compensation: 110_000.0,
            currency: "USD".to_string(),
            status: ContractStatus::Draft,
            created_at: at(2024, 9, 28, 12, 30),
        },
    ]
}

fn invoices() -> Vec<Invoice> {
    let invoice = |id: &str,
                   number: &str,
                   client_id: &str,
                   amount: f64,
                   issued_on: NaiveDate,
                   due_on: NaiveDate,
                   status: InvoiceStatus| Invoice {
        id: id.to_string(),
        number: number.to_string(),
        client_id: client_id.to_string(),
        amount,
        currency: "USD".to_string(),
        issued_on,
        due_on,
        status,
        notes: None,
    };
    vec![
        invoice(
            "inv-001",
            "INV-2024-031",
            "client-001",
            12_500.0,
            date(2024, 9, 15),
            date(2024, 10, 15),
            InvoiceStatus::Sent,
        ),
        invoice(
            "inv-002",
            "INV-2024-027",
            "client-003",
            8_300.5,
            date(2024, 7, 1),
            date(2024, 7, 31),
            InvoiceStatus::Overdue,
        ),
        invoice(
            "inv-003",
            "INV-2024-022",
            "client-002",
            9_800.0,
            date(2024, 6, 25),
            date(2024, 7, 25),
            InvoiceStatus::Paid,
        ),
        invoice(
            "inv-004",
            "INV-2024-033",
            "client-001",
            4_200.0,
            date(2024, 10, 1),
            date(2024, 10, 31),
            InvoiceStatus::Draft,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;

    #[test]
    fn test_fixtures_pass_validation() {
        let f = fixtures();
        for c in &f.candidates {
            assert!(c.validate().is_empty(), "{}: {:?}", c.id, c.validate());
        }
        for c in &f.clients {
            assert!(c.validate().is_empty(), "{}: {:?}", c.id, c.validate());
        }
        for v in &f.vendors {
            assert!(v.validate().is_empty(), "{}: {:?}", v.id, v.validate());
        }
        for e in &f.employees {
            assert!(e.validate().is_empty(), "{}: {:?}", e.id, e.validate());
        }
        for r in &f.chat_rooms {
            assert!(r.validate().is_empty(), "{}: {:?}", r.id, r.validate());
        }
        for k in &f.contracts {
            assert!(k.validate().is_empty(), "{}: {:?}", k.id, k.validate());
        }
        for i in &f.invoices {
            assert!(i.validate().is_empty(), "{}: {:?}", i.id, i.validate());
        }
    }

    #[test]
    fn test_messages_reference_existing_rooms() {
        let f = fixtures();
        for m in &f.messages {
            assert!(f.chat_rooms.iter().any(|r| r.id == m.room_id), "{}", m.id);
        }
    }

    #[test]
    fn test_contracts_reference_existing_parties() {
        let f = fixtures();
        for k in &f.contracts {
            assert!(f.candidates.iter().any(|c| c.id == k.candidate_id));
            assert!(f.clients.iter().any(|c| c.id == k.client_id));
        }
    }

    #[test]
    fn test_seeded_repositories_build() {
        assert!(crate::repo::Repositories::seeded().is_ok());
    }
}
