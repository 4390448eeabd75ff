pub mod provision_report_rto;
