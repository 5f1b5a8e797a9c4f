//! XSL-FO format tests

mod export;
