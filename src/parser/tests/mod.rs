//! Tests for the hours-of-rest record parser
//!
//! Fixtures mirror the two shapes real reports arrive in: PDF text-layer
//! output, where each table column is emitted as a run of lines, and OCR
//! output of a scanned sheet, where each day is one noisy line.


/// Text-layer output of one sheet, as extracted from an exported PDF
pub const COLUMN_LAYOUT_SHEET: &str = "Company Ltd\n\
RECORD OF HOURS OF REST\n\
\n\
Vessel:\n\
\n\
MV Northern Star\n\
\n\
Seafarer (Full Name):\n\
\n\
Jane Doe\n\
\n\
Position (Rank):\n\
\n\
Chief Officer\n\
\n\
January 2024\n\
\n\
Periods of work\n\
\n\
Date\n\
01/01/2024\n\
02/01/2024\n\
3l/02/2024\n\
04/01/2024\n\
\n\
Hours of rest\n\
in any 24h\n\
14\n\
13.5\n\
12\n\
N/A\n\
\n\
in any 7d\n\
84\n\
N/A\n\
88\n\
91\n\
\n\
Page 1/2 printed\n";

/// OCR output of one scanned sheet
pub const ROW_LAYOUT_SHEET: &str = "RECORD OF H0URS OF REST\r\n\
Vessel: MV Northern Star  Seafarer (Full Name): Jane Doe\r\n\
Position (Rank): Bosun\r\n\
Date  Hours of rest in any 24h  in any 7d\r\n\
01/02/2024 | 14 | 84\r\n\
02/02/2024 | l3.5 | 80\r\n\
03/02/2O24 | 12 | N/A\r\n\
04/02/2024 | garbage\r\n\
35/02/2024 | 10 | 70\r\n\
06/02/2024 | 30 | 70\r\n\
Page 2 of 2\r\n";
