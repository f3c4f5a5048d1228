use crate::types::RtpReport;

/// Emit an RTP report as a single JSON line to stdout.
pub fn report_rtp(report: &RtpReport) {
    if let Ok(json) = serde_json::to_string(report) {
        println!("{json}");
    }
}
