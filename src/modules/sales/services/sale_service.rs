// Sale intake: a sale, its invoices and (for cicilan sales) its installment
// schedule are written in a single database transaction.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::FinancePolicy;
use crate::core::{AppError, Money, Result};
use crate::modules::installments::{
    models::NewInstallmentPlan, repositories::InstallmentRepository, services::ScheduleGenerator,
};
use crate::modules::invoices::{
    models::{InvoiceNumber, InvoiceStatus, NewInvoice, NewPayment, PaymentType},
    repositories::{InvoiceRepository, PaymentRepository},
    services::InvoiceService,
};
use crate::modules::sales::models::{NewSale, RecordedSale};
use crate::modules::sales::repositories::SaleRepository;

/// Service for recording sales
pub struct SaleService {
    sales: SaleRepository,
    installments: InstallmentRepository,
    policy: FinancePolicy,
}

impl SaleService {
    pub fn new(sales: SaleRepository, installments: InstallmentRepository, policy: FinancePolicy) -> Self {
        Self {
            sales,
            installments,
            policy,
        }
    }

    /// Record a sale with everything it implies, all or nothing
    pub async fn record_sale(&self, request: NewSale) -> Result<RecordedSale> {
        let amounts = request.amounts()?;

        let mut tx = self.sales.pool().begin().await?;

        let sale = SaleRepository::create_with_tx(&mut tx, &request, amounts.total).await?;
        let (mut invoice, _) = InvoiceService::invoice_sale_with_tx(&mut tx, &sale, &self.policy).await?;

        let mut down_payment_invoice = None;
        if amounts.down_payment > Decimal::ZERO {
            let dp = amounts.down_payment;

            let receipt = InvoiceRepository::create_with_tx(
                &mut tx,
                &NewInvoice {
                    transaction_id: Some(sale.id),
                    client_id: Some(sale.client_id),
                    number: InvoiceNumber::down_payment(sale.id, request.date),
                    status: InvoiceStatus::Paid,
                    total_amount: dp,
                    paid_amount: dp,
                    due_date: Some(request.date),
                },
            )
            .await?;

            let payment = NewPayment {
                reference: Some(format!("DP-{}", sale.id)),
                ..NewPayment::approved(dp, PaymentType::Dp, request.date)
                    .for_invoice(invoice.id)
                    .for_sale(sale.id, sale.client_id)
            };
            PaymentRepository::create_with_tx(&mut tx, &payment).await?;

            let paid_amount = invoice.paid_amount + dp;
            let status = InvoiceStatus::derive(paid_amount, invoice.total_amount);
            InvoiceRepository::update_paid_with_tx(&mut tx, invoice.id, paid_amount, status).await?;
            invoice.paid_amount = paid_amount;
            invoice.status = status;

            down_payment_invoice = Some(receipt);
        }

        let mut plan_id = None;
        if let Some((financed, tenor)) = amounts.financed {
            let id = self
                .installments
                .create_plan_with_tx(
                    &mut tx,
                    &NewInstallmentPlan {
                        transaction_id: sale.id,
                        total_amount: financed,
                        tenor,
                        legacy_due_date: None,
                    },
                )
                .await?;

            let start_date = ScheduleGenerator::default_start_date(Some(request.date))?;
            let lines = ScheduleGenerator::build(financed, tenor, start_date)?;
            self.installments.replace_schedule_with_tx(&mut tx, id, &lines).await?;

            plan_id = Some(id);
        }

        tx.commit().await?;

        info!(
            transaction_id = sale.id,
            client_id = sale.client_id,
            method = %request.method,
            total = %Money::format_rupiah(amounts.total),
            down_payment = %Money::format_rupiah(amounts.down_payment),
            plan_id = ?plan_id,
            "Sale recorded"
        );

        let (plan, schedule) = match plan_id {
            Some(id) => {
                let plan = self.installments.find_plan(id).await?.ok_or_else(|| {
                    warn!(plan_id = id, "Installment plan vanished after commit");
                    AppError::internal("Installment plan not readable after sale")
                })?;
                (Some(plan), self.installments.list_lines(id).await?)
            }
            None => (None, Vec::new()),
        };

        Ok(RecordedSale {
            sale,
            invoice,
            down_payment_invoice,
            plan,
            schedule,
        })
    }
}
