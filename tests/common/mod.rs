use std::fs;
use std::path::Path;

pub const SCHEDULE_HEADER: &str = "document_number,student_id,application_id,intensity,disbursement_date,created_order,enrolment_confirmed,first_of_application,msfaa_number,actual_tuition,program_related_costs,status,value_code,estimated_amount";

pub const STUDENT_HEADER: &str = "student_id,sin,surname,given_name,birth_date,disability_verified,part_time_loan_limit_reached,stop_disbursement_restriction";

pub const OVERAWARD_HEADER: &str = "student_id,value_code,amount,origin,application_id,created_at";

pub const MSFAA_HEADER: &str = "msfaa_number,student_id,application_id,intensity,signed_date,cancelled_date,created_at";

pub fn write_fixture(path: &Path, header: &str, rows: &[&str]) {
    let mut contents = String::from(header);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(path, contents).unwrap();
}

/// A feedback line padded to the fixed inbound record length.
pub fn feedback_line(code: &str, body: &str) -> String {
    let mut line = format!("{code}{body}");
    while line.len() < 70 {
        line.push(' ');
    }
    line
}
